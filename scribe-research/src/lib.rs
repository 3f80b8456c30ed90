//! Report generation: request validation, corpus assembly and synthesis.
//!
//! [`ReportService`] ties the acquisition pipeline from `scribe-web` to a
//! completion model from `scribe-llm` and reports one of two terminal
//! outcomes: a finished [`Report`] or [`ReportOutcome::NoContent`] when no
//! page could be acquired.
pub mod request;
pub mod service;
pub mod synth;

pub use request::ReportRequest;
pub use service::{NO_CONTENT_MESSAGE, REPORT_HEADING, Report, ReportOutcome, ReportService};
pub use synth::Synthesizer;
