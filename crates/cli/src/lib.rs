pub mod config;
pub mod display;
pub mod pipeline;

pub use config::{AppConfig, ConfigError, Overrides, Settings};
pub use pipeline::{run, PipelineConfig, PipelineOutput, WrittenReports};
