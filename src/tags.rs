//! Parsing of the free-text tag field on the new-post form.

/// Split a raw tag string into a clean list: all whitespace is stripped,
/// the rest is split on commas, empty segments are dropped, and duplicates
/// are dropped keeping the first occurrence's position.
pub fn extract_tags(raw: &str) -> Vec<String> {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let mut cleaned: Vec<String> = Vec::new();
    for tag in stripped.split(',') {
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}
