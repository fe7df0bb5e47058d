//! Cache-key policy.
//!
//! Keys are flat strings: `product:<id>` for single items, `products:all`
//! for the unfiltered list and `products:<category>` for a filtered list.
//! List keys deliberately carry no page dimension; a cached list entry is
//! only ever the last known first-page snapshot written by a mutation,
//! never an answer for arbitrary pagination.

use furnish_core::ProductId;

/// Key for a single product.
#[must_use]
pub fn product(id: ProductId) -> String {
    format!("product:{id}")
}

/// Key for a list scope: a category, or the unfiltered list.
#[must_use]
pub fn product_list(category: Option<&str>) -> String {
    match category {
        Some(c) => format!("products:{c}"),
        None => "products:all".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        assert_eq!(product(42), "product:42");
        assert_eq!(product_list(None), "products:all");
        assert_eq!(product_list(Some("Seating")), "products:Seating");
    }
}
