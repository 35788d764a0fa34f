//! Shared domain types for project registration and execution.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Caller-assigned key of one registered program image.
pub type ProjectId = u64;

/// A registered program image, DEFLATE-compressed and hex-encoded at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub compressed_content: String,
}

impl ProjectRecord {
    pub fn new(project_id: ProjectId, compressed_content: impl Into<String>) -> Self {
        Self {
            project_id,
            compressed_content: compressed_content.into(),
        }
    }
}

/// One execute call, constructed per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub project_id: ProjectId,
    pub task_id: Option<u64>,
    pub client_id: Option<String>,
    pub sequencer_signature: Option<String>,
    /// Ordered JSON-encoded argument strings
    pub datas: Vec<String>,
}

impl ExecutionRequest {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    pub fn with_task_id(mut self, task_id: u64) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_sequencer_signature(mut self, signature: impl Into<String>) -> Self {
        self.sequencer_signature = Some(signature.into());
        self
    }

    pub fn with_datas<I, S>(mut self, datas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datas = datas.into_iter().map(Into::into).collect();
        self
    }

    /// Parameters handed to the proving engine, with `datas` folded into a
    /// single JSON array argument.
    pub fn invocation_params(&self) -> Result<InvocationParams> {
        Ok(InvocationParams {
            project_id: self.project_id,
            task_id: self.task_id,
            client_id: self.client_id.clone(),
            sequencer_signature: self.sequencer_signature.clone(),
            datas_json: serde_json::to_string(&self.datas)?,
        })
    }
}

/// Arguments of a single engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationParams {
    pub project_id: ProjectId,
    pub task_id: Option<u64>,
    pub client_id: Option<String>,
    pub sequencer_signature: Option<String>,
    pub datas_json: String,
}

impl InvocationParams {
    /// Engine arguments in invocation order: the project id, then each
    /// present optional as its own `--name=value` flag, then the datas JSON.
    /// Flags keep the optionals distinguishable when some are absent.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.project_id.to_string()];
        if let Some(task_id) = self.task_id {
            args.push(format!("--task-id={}", task_id));
        }
        if let Some(client_id) = &self.client_id {
            args.push(format!("--client-id={}", client_id));
        }
        if let Some(signature) = &self.sequencer_signature {
            args.push(format!("--sequencer-signature={}", signature));
        }
        args.push(self.datas_json.clone());
        args
    }
}
