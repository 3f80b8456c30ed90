//! Web acquisition for Scribe: turning a list of URLs into canonical pages.
//!
//! - URL cleanup for free-form user input (`urls`)
//! - Firecrawl batch extraction and single-page scrape (`firecrawl`)
//! - Direct download plus readability extraction (`direct`, `extract`)
//! - The tiered fallback orchestration tying them together (`pipeline`)
//!
//! Remote response shapes vary between service versions, so adapters resolve
//! fields through ordered synonym lists over `serde_json::Value` instead of a
//! fixed schema.

pub mod direct;
pub mod extract;
pub mod firecrawl;
pub mod outcome;
pub mod pipeline;
pub mod urls;

pub use outcome::Outcome;
pub use pipeline::AcquisitionPipeline;
