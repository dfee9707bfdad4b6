//! Usage: Login record persistence (opaque blob backends + remember-me gated token store).

use crate::domain::login_record::LoginRecord;
use crate::infra::atomic_file::write_atomic;
use crate::shared::error::OperationResult;
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::mask_token;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key-value blob store holding the single serialized login record.
pub trait LoginStore: Send + Sync {
    fn load(&self) -> OperationResult<Option<LoginRecord>>;

    fn save(&self, record: &LoginRecord) -> OperationResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileLoginStore {
    path: PathBuf,
}

impl FileLoginStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LoginStore for FileLoginStore {
    fn load(&self) -> OperationResult<Option<LoginRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read(&self.path)
            .map_err(|e| format!("STORAGE_ERROR: failed to read login record: {e}"))?;
        let record = serde_json::from_slice(&content)
            .map_err(|e| format!("STORAGE_ERROR: failed to parse login record: {e}"))?;
        Ok(Some(record))
    }

    fn save(&self, record: &LoginRecord) -> OperationResult<()> {
        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| format!("STORAGE_ERROR: failed to serialize login record: {e}"))?;
        write_atomic(&self.path, &content)
    }
}

/// In-process store; useful for tests and hosts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryLoginStore {
    slot: Mutex<Option<LoginRecord>>,
}

impl MemoryLoginStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LoginRecord) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }

    pub fn snapshot(&self) -> Option<LoginRecord> {
        self.slot.lock_or_recover().clone()
    }
}

impl LoginStore for MemoryLoginStore {
    fn load(&self) -> OperationResult<Option<LoginRecord>> {
        Ok(self.slot.lock_or_recover().clone())
    }

    fn save(&self, record: &LoginRecord) -> OperationResult<()> {
        *self.slot.lock_or_recover() = Some(record.clone());
        Ok(())
    }
}

/// Current login record plus its persistence policy.
///
/// The persisted copy only ever holds the real record while `remember_me` is set; otherwise
/// an empty record is written so no stale token survives a restart, while memory keeps the
/// value for the current run.
pub struct TokenStore {
    backend: Arc<dyn LoginStore>,
    record: LoginRecord,
}

impl TokenStore {
    pub fn load(backend: Arc<dyn LoginStore>, launcher_token: Option<&str>) -> Self {
        let mut record = match backend.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("failed to load saved login record; starting empty: {}", err);
                LoginRecord::default()
            }
        };

        if let Some(token) = launcher_token {
            tracing::warn!(jwt = %mask_token(token), "launcher login token is used");
            record.auth_token.jwt = token.to_string();
        }

        Self { backend, record }
    }

    pub fn record(&self) -> &LoginRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut LoginRecord {
        &mut self.record
    }

    /// Replace the in-memory record and persist it.
    pub fn replace(&mut self, record: LoginRecord) {
        self.record = record;
        self.save();
    }

    pub fn save(&self) {
        self.save_remembering(self.record.remember_me);
    }

    /// Persist under an explicit remember-me choice; `false` writes an empty record.
    pub fn save_remembering(&self, remember_me: bool) {
        let result = if remember_me {
            self.backend.save(&self.record)
        } else {
            self.backend.save(&LoginRecord::default())
        };
        if let Err(err) = result {
            tracing::warn!("failed to persist login record: {}", err);
        }
    }

    pub fn drop_record(&mut self, clear_persisted: bool) {
        self.record = LoginRecord::default();
        if clear_persisted {
            if let Err(err) = self.backend.save(&self.record) {
                tracing::warn!("failed to clear persisted login record: {}", err);
            }
        }
    }
}
