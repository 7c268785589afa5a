pub mod call_log;
pub mod config;
pub mod gateway;
pub mod metrics;
pub mod normalizer;
pub mod objects;
pub mod pipeline;
pub mod testing;

pub use call_log::{CallLog, CallLogEntry, CALL_LOG_CAPACITY};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use gateway::{
    DeletionOutcome, DeletionReport, Gateway, GatewayConfig, GatewayError, HttpGateway,
    RetrieveFormat,
};
pub use normalizer::{normalize, Payload, Record};
pub use objects::{ObjectName, ObjectRegistry};
pub use pipeline::{
    ExtractionPipeline, PipelineConfig, PipelineError, ResearchRequest, RunStage, RunStatus,
    SourceMode,
};
