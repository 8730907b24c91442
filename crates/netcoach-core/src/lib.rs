//! netcoach-core: Exam scoring, trend analysis, and report assembly.
//!
//! Everything here is a pure function over immutable snapshots read through
//! [`traits::ActivitySource`]. Storage, authentication and delivery of the
//! reports live elsewhere.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod recommendations;
pub mod report;
pub mod scoring;
pub mod source;
pub mod topics;
pub mod traits;
pub mod trend;

pub use error::{AnalysisError, Result};
