//! Template catalog access.
//!
//! - `raw`: the snake_case API records and their mapping onto [`TemplateCard`]
//! - `client`: HTTP client fetching every category from the catalog service
//!
//! [`TemplateCard`]: crate::types::TemplateCard

pub mod client;
pub mod raw;

pub use client::CatalogClient;
pub use raw::{RawFeature, RawTemplateItem, map_template_item, resolve_image};
