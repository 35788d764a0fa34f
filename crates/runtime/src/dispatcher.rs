//! Execution dispatcher.
//!
//! Runs one execute call: store lookup, hex decode, inflate, a fresh engine
//! (load, initialize, invoke), then result encoding. Nothing is retried; the
//! first failure ends the call. Everything after the lookup is bounded by the
//! configured timeout and by a semaphore limiting how many calls inflate or
//! run an engine at once.

use provevm_core::{ExecutionRequest, ProjectId, RuntimeConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use crate::codec;
use crate::encoder::{EngineOutput, ResultEncoder};
use crate::engine::EngineFactory;
use crate::error::{RuntimeError, RuntimeResult};
use crate::store::ProjectStore;

pub struct ExecutionDispatcher {
    store: ProjectStore,
    factory: Arc<dyn EngineFactory>,
    encoder: ResultEncoder,
    timeout: Duration,
    max_image_bytes: usize,
    slots: Arc<Semaphore>,
}

impl std::fmt::Debug for ExecutionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionDispatcher")
            .field("store", &self.store)
            .field("encoder", &self.encoder)
            .field("timeout", &self.timeout)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("available_slots", &self.slots.available_permits())
            .finish()
    }
}

impl ExecutionDispatcher {
    pub fn new(store: ProjectStore, factory: Arc<dyn EngineFactory>, config: &RuntimeConfig) -> Self {
        Self {
            store,
            factory,
            encoder: ResultEncoder::new(config.result_encoding),
            timeout: config.execution_timeout(),
            max_image_bytes: config.max_image_bytes,
            slots: Arc::new(Semaphore::new(config.max_concurrent_executions.max(1))),
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register (or replace) the compressed image of a project.
    ///
    /// Content is checked for presence only; decoding happens on execute.
    pub fn register(&self, project_id: ProjectId, content: String) -> RuntimeResult<()> {
        if content.trim().is_empty() {
            return Err(RuntimeError::InvalidArgument(format!(
                "content for projectID '{}' is empty",
                project_id
            )));
        }
        let replaced = self.store.register(project_id, content);
        tracing::info!(project_id, replaced, "registered project content");
        Ok(())
    }

    /// Execute the program registered for `request.project_id`.
    pub async fn execute(&self, request: ExecutionRequest) -> RuntimeResult<Vec<u8>> {
        let execution_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "execute",
            project_id = request.project_id,
            %execution_id
        );

        let result = self.run(request).instrument(span.clone()).await;
        let _entered = span.enter();
        match &result {
            Ok(bytes) => tracing::info!(result_len = bytes.len(), "execution succeeded"),
            Err(e) => tracing::warn!(kind = %e.kind(), error = %e, "execution failed"),
        }
        result
    }

    async fn run(&self, request: ExecutionRequest) -> RuntimeResult<Vec<u8>> {
        let project_id = request.project_id;
        let record = self.store.consume(project_id)?;
        let params = request.invocation_params()?;
        let max_image_bytes = self.max_image_bytes;

        let output = tokio::time::timeout(self.timeout, async {
            let slot = Arc::clone(&self.slots)
                .acquire_owned()
                .await
                .map_err(|_| RuntimeError::EngineInit("execution slots closed".to_string()))?;

            // The slot is held by the blocking inflation itself, so a call
            // abandoned on timeout keeps counting until inflation stops.
            let (image, _slot) = tokio::task::spawn_blocking(move || {
                codec::unpack_content(&record.compressed_content, max_image_bytes)
                    .map(|image| (image, slot))
            })
            .await
            .map_err(|e| RuntimeError::Decompression(format!("decompression task failed: {}", e)))??;
            tracing::debug!(image_len = image.len(), "decompressed program image");

            // Dropped at the end of this block, or with the future on timeout
            let mut engine = self.factory.create();
            engine.load_image(image)?;
            engine.initialize().await?;
            Ok::<_, RuntimeError>(engine.invoke(&params).await?)
        })
        .await
        .map_err(|_| RuntimeError::DeadlineExceeded {
            project_id,
            timeout: self.timeout,
        })??;

        Ok(self.encode(output))
    }

    fn encode(&self, output: EngineOutput) -> Vec<u8> {
        self.encoder.encode(output)
    }
}
