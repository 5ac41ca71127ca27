use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    username: Option<String>,
}

/// Remembers which user is logged in between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/taskboard/session.toml`, or the working directory when
    /// the platform has no data dir.
    pub fn default_location() -> Self {
        let path = dirs::data_local_dir()
            .map(|p| p.join("taskboard").join("session.toml"))
            .unwrap_or_else(|| PathBuf::from("./taskboard-session.toml"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn username(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let file: SessionFile = toml::from_str(&content)?;
        Ok(file.username.filter(|u| !u.is_empty()))
    }

    pub fn store(&self, username: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            username: Some(username.to_string()),
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        tracing::info!(username, "session stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write session file: {0}")]
    Serialize(#[from] toml::ser::Error),
}
