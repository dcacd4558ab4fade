//! Parsing context for product page extraction

use url::Url;

/// Detail parsing context for product detail pages
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Product URL being parsed (the normalized, untagged link)
    pub url: String,

    /// Parsed form of `url`, absent when it is not an absolute URL
    pub parsed_url: Option<Url>,

    /// User agent that fetched the document, for log provenance
    pub identity: Option<String>,
}

impl DetailParseContext {
    /// Create new detail parse context
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let parsed_url = Url::parse(&url).ok();
        Self {
            url,
            parsed_url,
            identity: None,
        }
    }

    /// Record which client identity produced the document
    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_string());
        self
    }

    /// First value of a query parameter on the page URL
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.parsed_url.as_ref().and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
    }
}
