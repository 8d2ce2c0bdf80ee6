pub mod config;
pub mod dashboard;
pub mod observability;
pub mod pipeline;
pub mod search;
pub mod sheet;
pub mod sinks;
pub mod sources;
pub mod transform;
pub mod views;

pub use pipeline::{ImportReport, Pipeline, PipelineError};
pub use views::Notice;
