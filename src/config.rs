//! Runtime configuration.
//!
//! Credentials are read once at startup into an immutable value that is passed
//! to whatever needs it; nothing reads the process environment after
//! construction. Missing names are fatal pre-flight, reported all at once.

use crate::error::{Error, Result};

pub const ENV_STORE_DOMAIN: &str = "SHOPIFY_STORE_DOMAIN";
pub const ENV_ADMIN_TOKEN: &str = "SHOPIFY_ADMIN_API_TOKEN";

/// Admin API credentials.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store domain, e.g. `example-nursery.myshopify.com`.
    pub store_domain: String,
    /// Admin API access token, sent as `X-Shopify-Access-Token`.
    pub admin_token: String,
}

impl Config {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an explicit lookup function. Tests pass a closure over
    /// fixture pairs instead of mutating the process environment.
    ///
    /// Empty values count as missing; every missing name is listed in the
    /// error, not just the first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut missing = Vec::new();
        let mut require = |name: &str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        };
        let store_domain = require(ENV_STORE_DOMAIN);
        let admin_token = require(ENV_ADMIN_TOKEN);
        if !missing.is_empty() {
            return Err(Error::Config { missing });
        }
        Ok(Self {
            store_domain,
            admin_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_missing_names_listed() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        match err {
            Error::Config { missing } => {
                assert_eq!(missing, vec![ENV_STORE_DOMAIN, ENV_ADMIN_TOKEN]);
            }
            other => panic!("expected Config error, got {other}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = Config::from_lookup(|name| {
            if name == ENV_STORE_DOMAIN {
                Some("shop.example.com".into())
            } else {
                Some("  ".into())
            }
        })
        .unwrap_err();
        match err {
            Error::Config { missing } => assert_eq!(missing, vec![ENV_ADMIN_TOKEN]),
            other => panic!("expected Config error, got {other}"),
        }
    }

    #[test]
    fn test_complete_lookup() {
        let config = Config::from_lookup(|name| {
            Some(match name {
                ENV_STORE_DOMAIN => "shop.example.com".to_string(),
                _ => "shpat_test".to_string(),
            })
        })
        .unwrap();
        assert_eq!(config.store_domain, "shop.example.com");
        assert_eq!(config.admin_token, "shpat_test");
    }
}
