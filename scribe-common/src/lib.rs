//! Common types and utilities shared across Scribe crates.
//!
//! This crate defines the canonical page record produced by the acquisition
//! pipeline, the truncation and title-fallback policies every adapter applies,
//! observability helpers, and the shared error type. It is intentionally
//! lightweight so that all crates can depend on it without heavy transitive
//! costs.
//!
//! # Overview
//!
//! - [`CanonicalPage`]: normalized `{url, title, text}` unit
//! - [`truncate_text`] and [`origin`]: policies shared by every adapter
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`ScribeError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use scribe_common::CanonicalPage;
//!
//! let page = CanonicalPage::build("https://example.com/a", None, "  hello  ", 8000)
//!     .expect("url and text present");
//! assert_eq!(page.title, "example.com");
//! assert_eq!(page.text, "hello");
//! ```

pub mod observability;
mod page;

pub use page::{origin, truncate_text, CanonicalPage, DEFAULT_PER_PAGE_LIMIT, TRUNCATION_MARKER};

/// Error types used across the Scribe system.
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    /// An adapter failed to complete a requested operation.
    #[error("Agent error: {0}")]
    Agent(String),

    /// A driver (network, extractor, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid. Always fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller supplied input that cannot start a report.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A remote call that must succeed for the request failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Convenient alias for results that use [`ScribeError`].
pub type Result<T> = std::result::Result<T, ScribeError>;
