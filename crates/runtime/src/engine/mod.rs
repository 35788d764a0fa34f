//! Proving engine abstraction.
//!
//! An engine stages one program image, builds an execution environment from
//! it, and runs it against the parameters of a single call. Engines carry
//! mutable state between those steps, so the dispatcher never shares one:
//! an [`EngineFactory`] hands out a fresh instance per execute call.

use async_trait::async_trait;
use provevm_core::InvocationParams;
use thiserror::Error;

use crate::encoder::EngineOutput;

pub mod process;

pub use process::{ProcessEngine, ProcessEngineFactory};

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failures reported by an engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected the program image or could not be set up
    #[error("{0}")]
    Init(String),

    /// The program failed while running
    #[error("{0}")]
    Execution(String),
}

/// Adapter around one external proving engine instance.
#[async_trait]
pub trait ProvingEngine: Send {
    /// Stage a program image, replacing any previously staged one.
    fn load_image(&mut self, image: Vec<u8>) -> EngineResult<()>;

    /// Build a fresh execution environment from the staged image.
    async fn initialize(&mut self) -> EngineResult<()>;

    /// Run the staged program.
    async fn invoke(&mut self, params: &InvocationParams) -> EngineResult<EngineOutput>;
}

/// Produces one isolated engine per execute call.
pub trait EngineFactory: Send + Sync + 'static {
    fn create(&self) -> Box<dyn ProvingEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Box<dyn ProvingEngine> + Send + Sync + 'static,
{
    fn create(&self) -> Box<dyn ProvingEngine> {
        self()
    }
}
