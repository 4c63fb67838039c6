use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub const DEFAULT_STORE_PATH: &str = "library/skills_database.json";
pub const STORE_PATH_ENV: &str = "SKILL_STORE_PATH";

/// Skill name to skill-script source.
pub type SourceMap = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("skill store i/o failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("skill store at {path:?} is not a JSON object of sources: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable home of the registry's source map.
pub trait SkillStore: Send + Sync + Debug {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SourceMap>, StoreError>;
    fn save(&self, sources: &SourceMap) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemorySkillStore {
    inner: RwLock<Option<SourceMap>>,
}

impl InMemorySkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: SourceMap) -> Self {
        Self {
            inner: RwLock::new(Some(sources)),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Io {
            path: PathBuf::from("<memory>"),
            source: io::Error::other("in-memory skill store poisoned"),
        }
    }
}

impl SkillStore for InMemorySkillStore {
    fn load(&self) -> Result<Option<SourceMap>, StoreError> {
        let guard = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(guard.clone())
    }

    fn save(&self, sources: &SourceMap) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| Self::poisoned())?;
        *guard = Some(sources.clone());
        Ok(())
    }
}

/// Pretty-printed JSON object on disk. Saves go through a sibling temp file
/// and a rename so a crash never leaves a truncated database behind.
#[derive(Debug, Clone)]
pub struct JsonFileSkillStore {
    path: PathBuf,
}

impl JsonFileSkillStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_env() -> Self {
        let path = std::env::var(STORE_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SkillStore for JsonFileSkillStore {
    fn load(&self) -> Result<Option<SourceMap>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, sources: &SourceMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut encoded =
            serde_json::to_string_pretty(sources).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        encoded.push('\n');

        let temp = self.temp_path();
        fs::write(&temp, encoded).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))
    }
}
