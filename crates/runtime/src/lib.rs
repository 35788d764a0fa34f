//! Proving runtime for the ProveVM service.
//!
//! Clients register a zlib-compressed, hex-encoded program image under a
//! project id and later execute it with call parameters. Each execute call
//! takes the stored image, inflates it, runs it on a freshly created proving
//! engine, and returns the engine's answer encoded for the wire.
//!
//! # Components
//!
//! - [`ProjectStore`]: project id to pending image, behind one mutex
//! - [`ExecutionDispatcher`]: lookup, decode, engine run, error translation
//! - [`ResultEncoder`]: engine output to response bytes
//! - [`ProvingEngine`] / [`EngineFactory`]: the external engine seam
//! - `grpc_server`: the `VmRuntime` service (feature `grpc-server`)

pub mod codec;
pub mod dispatcher;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod store;

#[cfg(feature = "grpc-server")]
pub mod grpc_server;

pub use codec::{pack_image, unpack_content};
pub use dispatcher::ExecutionDispatcher;
pub use encoder::{EngineOutput, ResultEncoder};
pub use engine::{
    EngineError, EngineFactory, EngineResult, ProcessEngine, ProcessEngineFactory, ProvingEngine,
};
pub use error::{ErrorKind, RuntimeError, RuntimeResult};
pub use store::ProjectStore;

#[cfg(feature = "grpc-server")]
pub use grpc_server::{serve_with_shutdown, VmRuntimeService};
