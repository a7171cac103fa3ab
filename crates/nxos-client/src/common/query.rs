//! Subtree query paths
//!
//! NX-API lists objects of one class below a DN with
//! `?query-target=subtree&target-subtree-class=<class>`.

use crate::common::build_query_string;

/// Query every `class` object below `base`
#[must_use]
pub fn subtree_query(base: &str, class: &str) -> String {
    format!(
        "{}?{}",
        base,
        build_query_string(&[("query-target", "subtree"), ("target-subtree-class", class)])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtree_query() {
        assert_eq!(
            subtree_query("/api/mo/sys/intf.json", "l1PhysIf"),
            "/api/mo/sys/intf.json?query-target=subtree&target-subtree-class=l1PhysIf"
        );
    }
}
