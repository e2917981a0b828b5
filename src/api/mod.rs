mod config;
mod engine;

pub use config::{TIMELINE_CONFIG_JSON_SCHEMA_V1, TimelineConfig, TimelineConfigJsonContractV1};
pub use engine::{TimelineEngine, TimelineFrame};
