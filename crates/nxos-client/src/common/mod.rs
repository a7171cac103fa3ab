//! Common helpers for building NX-API URLs and paths

pub mod query;

/// Path every configuration write is posted to
pub const CONFIG_ROOT_PATH: &str = "/api/mo.json";

/// Scheme every API request must use
pub const API_SCHEME: &str = "https";

/// Build `<scheme>://<host><path>`
#[must_use]
pub fn make_url(scheme: &str, host: &str, path: &str) -> String {
    format!("{}://{}{}", scheme, host, path)
}

/// Build query string from filters
#[must_use]
pub fn build_query_string(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_url() {
        assert_eq!(
            make_url(API_SCHEME, "10.0.0.1", "/api/aaaLogin.json"),
            "https://10.0.0.1/api/aaaLogin.json"
        );
    }

    #[test]
    fn test_build_query_string() {
        assert_eq!(build_query_string(&[]), "");
        assert_eq!(
            build_query_string(&[("query-target", "subtree"), ("rsp-subtree-filter", "eq(l2BD.id,\"1\")")]),
            "query-target=subtree&rsp-subtree-filter=eq%28l2BD.id%2C%221%22%29"
        );
    }
}
