pub mod config;
pub mod pipeline;
pub mod plot;
pub mod report;

pub use config::{DisplayConfig, PipelineConfig};
pub use pipeline::CryptoPipeline;
