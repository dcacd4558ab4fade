//! Amazon URL classification and canonicalization
//!
//! Pure functions over raw link strings: deciding whether a link belongs to
//! Amazon, pulling the ASIN out of it and rebuilding the minimal
//! `https://www.amazon.it/dp/<ASIN>` form that the rest of the pipeline
//! works on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Hosts accepted as Amazon links (regional shops and short-link services)
pub const AMAZON_DOMAINS: &[&str] = &["amazon.it", "amazon.com", "amzn.eu", "amzn.to", "amzlink.to"];

/// Canonical product page prefix for the default marketplace
pub const CANONICAL_PRODUCT_BASE: &str = "https://www.amazon.it/dp/";

/// Query parameters carried over into the normalized URL, in output order
pub const PRESERVED_PARAMS: &[&str] = &["smid", "condition", "psc", "aod", "m", "s"];

static DP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/dp/([A-Z0-9]{10})").expect("valid /dp/ pattern"));
static GP_PRODUCT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/gp/product/([A-Z0-9]{10})").expect("valid /gp/product/ pattern"));

/// Amazon Standard Identification Number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asin(String);

impl Asin {
    /// Extract the ASIN from a link, trying `/dp/` before `/gp/product/`
    pub fn from_url(url: &str) -> Option<Self> {
        DP_PATTERN
            .captures(url)
            .or_else(|| GP_PRODUCT_PATTERN.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Asin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Host matching policy for [`AmazonUrlPolicy::accepts`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmazonUrlPolicy {
    /// Require the host to equal a known domain or be a subdomain of it.
    /// When false, any host containing a known domain as a substring passes.
    pub strict: bool,
}

impl AmazonUrlPolicy {
    pub const fn permissive() -> Self {
        Self { strict: false }
    }

    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Decide whether `candidate` is an Amazon link this service can convert
    pub fn accepts(&self, candidate: &str) -> bool {
        let Ok(parsed) = Url::parse(candidate) else {
            debug!("Rejecting unparseable URL: {}", candidate);
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };

        let host = host.to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        AMAZON_DOMAINS.iter().any(|domain| {
            if self.strict {
                host == *domain || host.ends_with(&format!(".{domain}"))
            } else {
                host.contains(domain)
            }
        })
    }
}

/// Permissive classification, matching known domains as host substrings
pub fn is_amazon_url(candidate: &str) -> bool {
    AmazonUrlPolicy::permissive().accepts(candidate)
}

/// Strip trailing slashes and repair a stray `?&`
pub(crate) fn clean_url(url: &str) -> String {
    url.trim_end_matches('/').replace("?&", "?")
}

/// Canonicalize an Amazon product link to `https://www.amazon.it/dp/<ASIN>`
///
/// Only [`PRESERVED_PARAMS`] survive, in that fixed order. Links without an
/// ASIN (short links, search pages) come back cleaned but otherwise intact,
/// and anything that fails to parse is returned exactly as given.
pub fn normalize_amazon_url(url: &str) -> String {
    let cleaned = clean_url(url);

    let Some(asin) = Asin::from_url(&cleaned) else {
        debug!("No ASIN in {}, passing through", cleaned);
        return cleaned;
    };

    let parsed = match Url::parse(&cleaned) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Error normalizing URL {}: {}", url, e);
            return url.to_string();
        }
    };

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut preserved = 0usize;
    for name in PRESERVED_PARAMS {
        let value = parsed
            .query_pairs()
            .find(|(key, value)| key == *name && !value.is_empty())
            .map(|(_, value)| value);
        if let Some(value) = value {
            query.append_pair(name, &value);
            preserved += 1;
        }
    }

    let mut normalized = format!("{CANONICAL_PRODUCT_BASE}{asin}");
    if preserved > 0 {
        normalized.push('?');
        normalized.push_str(&query.finish());
    }
    normalized
}
