//! Domain module - link conversion entities and pure URL rules
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod affiliate;
pub mod amazon_url;
pub mod conversion;
pub mod product;

pub use affiliate::add_affiliate_tag;
pub use amazon_url::{is_amazon_url, normalize_amazon_url, AmazonUrlPolicy, Asin};
pub use conversion::{ConversionError, ConversionResult};
pub use product::{ProductCondition, ProductInfo, PLACEHOLDER_TITLE};
