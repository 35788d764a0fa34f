//! Engine backed by an external prover executable.
//!
//! `initialize` stages the program image in a private temporary file and
//! `invoke` runs
//! `<command> <args..> <image-path> <project_id> [--task-id=N] [--client-id=S] [--sequencer-signature=S] <datas-json>`,
//! taking stdout as the result. Text output loses trailing line breaks;
//! binary output is returned as is. The child is killed if the call is
//! dropped (for example on timeout) and the image file is removed with the
//! engine.

use async_trait::async_trait;
use provevm_core::{EngineConfig, InvocationParams};
use std::io::Write;
use std::process::Stdio;
use tempfile::NamedTempFile;

use super::{EngineError, EngineFactory, EngineResult, ProvingEngine};
use crate::encoder::EngineOutput;

/// Longest stderr excerpt carried in an execution error.
const MAX_STDERR_EXCERPT: usize = 2048;

#[derive(Debug)]
pub struct ProcessEngine {
    command: String,
    args: Vec<String>,
    image: Option<Vec<u8>>,
    staged: Option<NamedTempFile>,
}

impl ProcessEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            image: None,
            staged: None,
        }
    }
}

#[async_trait]
impl ProvingEngine for ProcessEngine {
    fn load_image(&mut self, image: Vec<u8>) -> EngineResult<()> {
        if image.is_empty() {
            return Err(EngineError::Init("program image is empty".to_string()));
        }
        self.image = Some(image);
        self.staged = None;
        Ok(())
    }

    async fn initialize(&mut self) -> EngineResult<()> {
        let image = self
            .image
            .take()
            .ok_or_else(|| EngineError::Init("no program image loaded".to_string()))?;

        let staged = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("provevm-image-")
                .tempfile()?;
            file.write_all(&image)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| EngineError::Init(format!("image staging task failed: {}", e)))?
        .map_err(|e| EngineError::Init(format!("failed to stage program image: {}", e)))?;

        tracing::debug!(path = %staged.path().display(), "staged program image");
        self.staged = Some(staged);
        Ok(())
    }

    async fn invoke(&mut self, params: &InvocationParams) -> EngineResult<EngineOutput> {
        let staged = self
            .staged
            .as_ref()
            .ok_or_else(|| EngineError::Init("engine not initialized".to_string()))?;

        let output = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(staged.path())
            .args(params.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                EngineError::Init(format!("failed to spawn '{}': {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let excerpt = match stderr.char_indices().nth(MAX_STDERR_EXCERPT) {
                Some((idx, _)) => &stderr[..idx],
                None => stderr,
            };
            return Err(EngineError::Execution(format!(
                "engine exited with {}: {}",
                output.status, excerpt
            )));
        }

        Ok(match EngineOutput::from_bytes(output.stdout) {
            EngineOutput::Text(text) => {
                let trimmed = text.trim_end_matches(|c| c == '\n' || c == '\r');
                EngineOutput::Text(trimmed.to_string())
            }
            bytes => bytes,
        })
    }
}

/// Creates one [`ProcessEngine`] per call from the `[engine]` config.
#[derive(Debug, Clone)]
pub struct ProcessEngineFactory {
    config: EngineConfig,
}

impl ProcessEngineFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl EngineFactory for ProcessEngineFactory {
    fn create(&self) -> Box<dyn ProvingEngine> {
        Box::new(ProcessEngine::new(&self.config))
    }
}
