// src/fetch/mod.rs
pub mod browser;
pub mod price;

pub use browser::ChromePage;
pub use price::{PriceSource, YahooPriceSource};

use anyhow::Result;
use url::Url;

/// Something that can hand back the fully rendered HTML of a page.
///
/// Implementations may block; the pipeline calls them off the async runtime.
pub trait PageSource {
    fn page_source(&self, url: &Url) -> Result<String>;
}
