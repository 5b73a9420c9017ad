//! Shopify global ids (`gid://shopify/<Type>/<numeric id>`).

use salesort_core::ProductId;

pub const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// Builds the product global id, or `None` if the numeric id is not a valid
/// Shopify id (non-empty digits that fit in 64 bits, not zero).
#[must_use]
pub fn product_gid(id: &ProductId) -> Option<String> {
    let raw = id.as_str();
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Some(format!("{PRODUCT_GID_PREFIX}{n}")),
        _ => None,
    }
}

/// Returns the trailing numeric segment of a global id, e.g. the job or
/// collection number, for compact log output.
#[must_use]
pub fn numeric_tail(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ProductId {
        ProductId::parse(raw).expect("digits")
    }

    #[test]
    fn builds_product_gid() {
        assert_eq!(
            product_gid(&id("7421")).as_deref(),
            Some("gid://shopify/Product/7421")
        );
    }

    #[test]
    fn leading_zeros_are_normalized() {
        assert_eq!(
            product_gid(&id("0042")).as_deref(),
            Some("gid://shopify/Product/42")
        );
    }

    #[test]
    fn rejects_zero_and_overflow() {
        assert!(product_gid(&id("0")).is_none());
        assert!(product_gid(&id("99999999999999999999999")).is_none());
    }

    #[test]
    fn numeric_tail_of_gid() {
        assert_eq!(numeric_tail("gid://shopify/Collection/123"), "123");
        assert_eq!(numeric_tail("plain"), "plain");
    }
}
