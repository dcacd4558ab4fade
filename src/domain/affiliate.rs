//! Affiliate tag injection

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]tag=[^&#]*").expect("valid tag pattern"));

/// Rewrite `url` so it carries exactly one `tag=<tag>` parameter
///
/// Any existing `tag` value is dropped before the new one is appended, so
/// tagging an already tagged link is a no-op apart from the tag value. A
/// `#fragment` is kept at the end; only the query is rewritten.
pub fn add_affiliate_tag(url: &str, tag: &str) -> String {
    let (base, fragment) = url.split_at(url.find('#').unwrap_or(url.len()));
    let base = base.trim_end_matches('/');

    // A dropped leading `?tag=` hands its `?` to whatever follows
    let untagged = TAG_PARAM
        .replace_all(base, |caps: &Captures| if caps[0].starts_with('?') { "?" } else { "" })
        .replace("?&", "?");

    let tagged = if untagged.ends_with('?') {
        format!("{untagged}tag={tag}")
    } else if untagged.contains('?') {
        format!("{untagged}&tag={tag}")
    } else {
        format!("{untagged}?tag={tag}")
    };
    format!("{tagged}{fragment}")
}
