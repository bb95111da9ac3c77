//! Authentication Gate
//!
//! Decides whether a private-namespace request presented the shared secret.
//! The gate is only consulted for the private namespace; public requests
//! never reach it. It reads the `Authorization` header (exact,
//! case-sensitive name; first occurrence wins) and compares the value
//! byte for byte against the configured secret.
//!
//! The caller — the connection worker — records the auth-failure statistic
//! exactly once per rejected request; the gate itself touches no state.

use crate::config::ServerConfig;
use crate::protocol::types::AUTHORIZATION;
use crate::protocol::Request;

/// Returns `true` when the request carries the configured shared secret.
/// An absent `Authorization` header fails.
pub fn authenticate(request: &Request, config: &ServerConfig) -> bool {
    match request.header(AUTHORIZATION) {
        Some(credential) => credential == config.shared_secret,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Method, Namespace};

    fn private_request(headers: Vec<(String, String)>) -> Request {
        Request {
            method: Some(Method::Get),
            namespace: Some(Namespace::Private),
            key: "k".to_string(),
            headers,
            body: None,
            authenticated: true,
        }
    }

    fn config() -> ServerConfig {
        ServerConfig::new("s3cr3t", 0)
    }

    #[test]
    fn test_matching_secret_passes() {
        let request = private_request(vec![(
            "Authorization".to_string(),
            "s3cr3t".to_string(),
        )]);
        assert!(authenticate(&request, &config()));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let request = private_request(vec![(
            "Authorization".to_string(),
            "wrong".to_string(),
        )]);
        assert!(!authenticate(&request, &config()));
    }

    #[test]
    fn test_missing_header_fails() {
        let request = private_request(vec![]);
        assert!(!authenticate(&request, &config()));
    }

    #[test]
    fn test_header_name_is_case_sensitive() {
        let request = private_request(vec![(
            "authorization".to_string(),
            "s3cr3t".to_string(),
        )]);
        assert!(!authenticate(&request, &config()));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let request = private_request(vec![
            ("Authorization".to_string(), "wrong".to_string()),
            ("Authorization".to_string(), "s3cr3t".to_string()),
        ]);
        assert!(!authenticate(&request, &config()));
    }

    #[test]
    fn test_secret_comparison_is_exact() {
        let request = private_request(vec![(
            "Authorization".to_string(),
            "s3cr3t ".to_string(),
        )]);
        assert!(!authenticate(&request, &config()));
    }
}
