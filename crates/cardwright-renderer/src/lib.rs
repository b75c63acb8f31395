//! Preview rendering for card text.
//!
//! - [`markdown`]: the constrained card markdown dialect rendered to HTML
//! - [`sanitize`]: HTML escaping, href allow-listing and link stripping for
//!   plain-text fields

pub mod markdown;
pub mod sanitize;

pub use markdown::{render_inline, render_markdown};
pub use sanitize::{escape_html, sanitize_href, strip_markdown_links};

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub(crate) use regex::{Captures, Regex};
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub(crate) use regex_lite::{Captures, Regex};
