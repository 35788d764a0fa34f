//! Project content store.
//!
//! Maps a project id to the compressed program image registered for it.
//! All access goes through one mutex, so a lookup and its removal are a
//! single atomic step: two concurrent execute calls for the same project
//! never both observe a single-use record.

use provevm_core::{ConsumePolicy, ProjectId, ProjectRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{RuntimeError, RuntimeResult};

/// Registry of pending program images, shared between service handlers.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    records: Arc<Mutex<HashMap<ProjectId, ProjectRecord>>>,
    policy: ConsumePolicy,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(ConsumePolicy::default())
    }
}

impl ProjectStore {
    pub fn new(policy: ConsumePolicy) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    pub fn policy(&self) -> ConsumePolicy {
        self.policy
    }

    // Every critical section is a single map operation, so a poisoned map
    // is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<ProjectId, ProjectRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the record for `project_id`.
    ///
    /// Returns `true` when an earlier record was replaced.
    pub fn register(&self, project_id: ProjectId, compressed_content: impl Into<String>) -> bool {
        let record = ProjectRecord::new(project_id, compressed_content);
        let replaced = self.lock().insert(project_id, record).is_some();
        if replaced {
            tracing::debug!(project_id, "replaced registered project content");
        }
        replaced
    }

    /// Fetch the record for `project_id` according to the store's policy.
    pub fn consume(&self, project_id: ProjectId) -> RuntimeResult<ProjectRecord> {
        let mut records = self.lock();
        let record = match self.policy {
            ConsumePolicy::SingleUse => records.remove(&project_id),
            ConsumePolicy::Reusable => records.get(&project_id).cloned(),
        };
        record.ok_or(RuntimeError::NotFound { project_id })
    }

    pub fn contains(&self, project_id: ProjectId) -> bool {
        self.lock().contains_key(&project_id)
    }

    pub fn remove(&self, project_id: ProjectId) -> Option<ProjectRecord> {
        self.lock().remove(&project_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
