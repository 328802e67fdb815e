/// Returns the first region, in gazetteer order, that appears anywhere in the title
pub fn find_region<'a>(title: &str, regions: &'a [String]) -> Option<&'a str> {
    regions
        .iter()
        .find(|region| title.contains(region.as_str()))
        .map(String::as_str)
}
