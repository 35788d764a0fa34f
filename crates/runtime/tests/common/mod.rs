//! Shared helpers for runtime integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use provevm_core::{ConsumePolicy, InvocationParams, RuntimeConfig};
use provevm_runtime::{
    EngineError, EngineFactory, EngineOutput, EngineResult, ExecutionDispatcher, ProjectStore,
    ProvingEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Engine mock that answers `<image>|<datas-json>`.
///
/// Only images starting with `program` initialize. `delay` is spent between
/// initialize and the answer so concurrent calls overlap.
pub struct MockEngine {
    staged: Option<Vec<u8>>,
    ready: Option<Vec<u8>>,
    delay: Duration,
    live: Arc<AtomicUsize>,
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProvingEngine for MockEngine {
    fn load_image(&mut self, image: Vec<u8>) -> EngineResult<()> {
        self.staged = Some(image);
        Ok(())
    }

    async fn initialize(&mut self) -> EngineResult<()> {
        match self.staged.take() {
            Some(image) if image.starts_with(b"program") => {
                self.ready = Some(image);
                Ok(())
            }
            _ => Err(EngineError::Init("image is not a program".to_string())),
        }
    }

    async fn invoke(&mut self, params: &InvocationParams) -> EngineResult<EngineOutput> {
        tokio::time::sleep(self.delay).await;
        let image = self
            .ready
            .as_ref()
            .ok_or_else(|| EngineError::Execution("engine not initialized".to_string()))?;
        if params.datas_json.contains("fail") {
            return Err(EngineError::Execution("witness generation failed".to_string()));
        }
        Ok(EngineOutput::Text(format!(
            "{}|{}",
            String::from_utf8_lossy(image),
            params.datas_json
        )))
    }
}

#[derive(Clone, Default)]
pub struct MockEngineFactory {
    pub delay: Duration,
    pub created: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
}

impl MockEngineFactory {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self) -> Box<dyn ProvingEngine> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Box::new(MockEngine {
            staged: None,
            ready: None,
            delay: self.delay,
            live: Arc::clone(&self.live),
        })
    }
}

pub fn dispatcher_with(
    factory: MockEngineFactory,
    policy: ConsumePolicy,
    config: RuntimeConfig,
) -> Arc<ExecutionDispatcher> {
    Arc::new(ExecutionDispatcher::new(
        ProjectStore::new(policy),
        Arc::new(factory),
        &config,
    ))
}

pub fn dispatcher(factory: MockEngineFactory) -> Arc<ExecutionDispatcher> {
    dispatcher_with(factory, ConsumePolicy::SingleUse, RuntimeConfig::default())
}

/// Response bytes the default encoder produces for a mock answer.
pub fn expected_result(image: &str, datas: &[&str]) -> Vec<u8> {
    let datas_json = serde_json::to_string(datas).unwrap();
    hex::encode(format!("{}|{}", image, datas_json)).into_bytes()
}
