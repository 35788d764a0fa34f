//! gRPC VmRuntime service.
//!
//! Exposes `Create` (register a compressed program image under a project id)
//! and `Execute` (run it through the proving engine). Each call maps to a
//! single dispatcher operation; failures become a `Status` whose code follows
//! the error kind and whose message is the error text.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use provevm_core::ExecutionRequest;
use tonic::{transport::Server, Request, Response, Status};

pub mod proto {
    tonic::include_proto!("vm_runtime");
}

use proto::vm_runtime_server::{VmRuntime, VmRuntimeServer};
use proto::*;

use crate::dispatcher::ExecutionDispatcher;

/// VmRuntime gRPC implementation
#[derive(Debug, Clone)]
pub struct VmRuntimeService {
    dispatcher: Arc<ExecutionDispatcher>,
}

impl VmRuntimeService {
    pub fn new(dispatcher: Arc<ExecutionDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn into_server(self) -> VmRuntimeServer<Self> {
        VmRuntimeServer::new(self)
    }
}

impl From<ExecuteRequest> for ExecutionRequest {
    fn from(req: ExecuteRequest) -> Self {
        ExecutionRequest {
            project_id: req.project_id,
            task_id: req.task_id,
            client_id: req.client_id,
            sequencer_signature: req.sequencer_signature,
            datas: req.datas,
        }
    }
}

#[tonic::async_trait]
impl VmRuntime for VmRuntimeService {
    /// Register a program image
    async fn create(
        &self,
        request: Request<CreateRequest>,
    ) -> Result<Response<CreateResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(project_id = req.project_id, "create vm");
        if !req.exp_params.is_empty() {
            tracing::debug!(
                project_id = req.project_id,
                count = req.exp_params.len(),
                "ignoring exp_params"
            );
        }

        self.dispatcher.register(req.project_id, req.content)?;

        Ok(Response::new(CreateResponse {}))
    }

    /// Execute a registered program
    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<ExecuteResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(project_id = req.project_id, "execute vm");

        let result = self.dispatcher.execute(req.into()).await?;

        Ok(Response::new(ExecuteResponse { result }))
    }
}

/// Serve until `shutdown` resolves, then drain in-flight calls.
pub async fn serve_with_shutdown<F>(
    addr: SocketAddr,
    dispatcher: Arc<ExecutionDispatcher>,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    let service = VmRuntimeService::new(dispatcher);

    tracing::info!("VmRuntime gRPC server listening on {}", addr);

    Server::builder()
        .add_service(service.into_server())
        .serve_with_shutdown(addr, shutdown)
        .await
}
