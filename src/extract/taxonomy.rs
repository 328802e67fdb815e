use crate::config::TaxonomyConfig;
use crate::extract::location::find_region;
use crate::record::Category;

/// Returns the key of the first set holding an alias found in `text`
///
/// Sets are tried in table order and aliases within a set in listed order;
/// the test is plain substring containment.
pub fn first_matching_set<K: Copy>(text: &str, table: &[(K, Vec<String>)]) -> Option<K> {
    table
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| text.contains(alias.as_str())))
        .map(|(key, _)| *key)
}

/// Category and region lookup tables
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<(Category, Vec<String>)>,
    regions: Vec<String>,
}

impl Taxonomy {
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        Self {
            categories: config
                .categories
                .iter()
                .map(|row| (row.category, row.aliases.clone()))
                .collect(),
            regions: config.regions.clone(),
        }
    }

    /// Classifies a raw title; `None` means the post is not an Apple product we track
    pub fn classify(&self, title: &str) -> Option<Category> {
        first_matching_set(&title.to_lowercase(), &self.categories)
    }

    /// Returns the first configured region named in the title
    pub fn locate<'a>(&'a self, title: &str) -> Option<&'a str> {
        find_region(title, &self.regions)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::from_config(&TaxonomyConfig::default())
    }
}
