//! CLI command implementations.

pub mod aggregate;

pub use aggregate::{AggregateCommand, AggregateReport};
