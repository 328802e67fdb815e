use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Text written in place of a price that could not be read confidently
pub const PRICE_PENDING: &str = "detail-pending";

/// Asking price of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Price {
    /// Price in whole dollars, rendered as `$<digits>`
    Amount(u64),

    /// No plausible price found; readers should consult the post body
    Pending,
}

impl Price {
    /// Normalizes a raw monetary token
    ///
    /// Every non-digit character is dropped (sigils, thousands separators,
    /// spaces). The remaining number must be strictly greater than
    /// `threshold` to count as a price; anything else is [`Price::Pending`].
    ///
    /// Normalizing an already normalized `"$1234"` yields `"$1234"` again.
    pub fn normalize(raw: &str, threshold: u64) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Self::Pending;
        }

        match digits.parse::<u64>() {
            Ok(value) if value > threshold => Self::Amount(value),
            _ => Self::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(value) => write!(f, "${}", value),
            Self::Pending => f.write_str(PRICE_PENDING),
        }
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == PRICE_PENDING {
            return Ok(Self::Pending);
        }

        s.strip_prefix('$')
            .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(Self::Amount)
            .ok_or_else(|| format!("invalid price '{}'", s))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
