//! Core functionality for the ProveVM proving runtime.
//!
//! This crate provides the configuration, error, logging, and domain types
//! shared by the runtime library and the node service.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{
    Config, ConsumePolicy, EngineConfig, LogFormat, LoggingConfig, ResultEncoding, RuntimeConfig,
    ServerConfig,
};
pub use error::{CoreError, Result};
pub use types::{ExecutionRequest, InvocationParams, ProjectId, ProjectRecord};
