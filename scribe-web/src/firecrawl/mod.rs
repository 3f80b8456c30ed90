//! Firecrawl adapter: REST client plus tolerant payload interpretation.
pub mod client;
pub mod types;

pub use client::{DEFAULT_FIRECRAWL_TIMEOUT, ExtractionService, FIRECRAWL_API_BASE, FirecrawlClient};
pub use types::{RawRow, ScrapedFields, extract_rows, scraped_fields};
