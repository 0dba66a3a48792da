//! # Client-Side Search
//!
//! Pure filtering over already-loaded products. Never touches I/O and never
//! affects pagination state; it recomputes a view over whatever the engine
//! has published.
//!
//! Matching is a case-insensitive substring test on the product name. The
//! empty query matches everything, so an empty search box shows the full
//! loaded list unchanged.

use crate::types::Product;

/// Returns true if `name` matches `query`.
///
/// Case folding goes through `to_lowercase` so non-ASCII names (the catalog
/// is not English-only) fold the same way on both sides.
pub fn matches_query(name: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&query.to_lowercase())
}

/// Filters `items` down to the subsequence whose names match `query`,
/// preserving the original order.
pub fn filter_by_name(items: &[Product], query: &str) -> Vec<Product> {
    if query.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|p| matches_query(&p.name, query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, ProductRecord};

    fn product(id: &str, name: &str) -> Product {
        Product::from_record(
            ProductRecord {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                images: Vec::new(),
            },
            false,
        )
    }

    fn names(items: &[Product]) -> Vec<&str> {
        items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let items = vec![product("p1", "Kettle"), product("p2", "Mug")];
        let result = filter_by_name(&items, "");
        assert_eq!(names(&result), vec!["Kettle", "Mug"]);
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let items = vec![
            product("p1", "Electric Kettle"),
            product("p2", "Mug"),
            product("p3", "kettle descaler"),
        ];
        let result = filter_by_name(&items, "KETTLE");
        assert_eq!(names(&result), vec!["Electric Kettle", "kettle descaler"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let items = vec![product("p1", "Kettle")];
        assert!(filter_by_name(&items, "toaster").is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let items = vec![product("p1", "Kettle"), product("p2", "Mug")];
        let before = items.clone();
        let _ = filter_by_name(&items, "mug");
        assert_eq!(items, before);
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let items = vec![product("p1", "Чайник"), product("p2", "Кружка")];
        let result = filter_by_name(&items, "чайник");
        assert_eq!(names(&result), vec!["Чайник"]);
    }
}
