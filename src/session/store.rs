use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::api::models::User;
use crate::session::SessionError;

/// What survives a restart: who is logged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user: User,
    #[serde(default)]
    pub logged_in: bool,
}

/// JSON file holding the [`SessionRecord`], read and written under an
/// exclusive advisory lock so two processes never interleave.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{data_dir}/campus-connect/session.json`.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        dirs::data_dir()
            .map(|dir| dir.join("campus-connect").join("session.json"))
            .ok_or(SessionError::NoDataDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, empty, or logged-out records all read as `None`.
    pub fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        file.lock_shared().map_err(|e| self.io_error(e))?;
        let mut raw = String::new();
        let read = file.read_to_string(&mut raw);
        let _ = FileExt::unlock(&file);
        read.map_err(|e| self.io_error(e))?;

        if raw.trim().is_empty() {
            return Ok(None);
        }
        let record: SessionRecord = serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(record.logged_in.then_some(record))
    }

    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        self.write_locked(json.as_bytes())
    }

    /// Truncate the record. Absent file is already clear.
    pub fn clear(&self) -> Result<(), SessionError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.write_locked(&[])
    }

    fn write_locked(&self, bytes: &[u8]) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.lock_exclusive().map_err(|e| self.io_error(e))?;
        // Truncate only once the lock is held so a concurrent reader never
        // sees a half-written record.
        let written = file
            .set_len(0)
            .and_then(|_| file.seek(SeekFrom::Start(0)))
            .and_then(|_| file.write_all(bytes))
            .and_then(|_| file.sync_all());
        let _ = FileExt::unlock(&file);
        written.map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
