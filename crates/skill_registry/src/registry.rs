use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

use log::{debug, error, info, warn};
use regex::Regex;
use sha2::{Digest, Sha256};
use spatial_skills::Skill;

use crate::RegistryError;
use crate::defaults::default_skills;
use crate::store::{JsonFileSkillStore, SkillStore, SourceMap, StoreError};

static NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").ok());

fn valid_name(name: &str) -> bool {
    NAME_PATTERN.as_ref().is_some_and(|re| re.is_match(name))
}

fn canonical(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

pub fn source_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillOrigin {
    Builtin,
    Stored,
    Replaced,
}

#[derive(Clone, Debug)]
pub struct SkillEntry {
    skill: Arc<dyn Skill>,
    version: u64,
    digest: String,
    origin: SkillOrigin,
}

impl SkillEntry {
    fn new(skill: Arc<dyn Skill>, version: u64, origin: SkillOrigin) -> Self {
        let digest = source_digest(skill.source());
        Self {
            skill,
            version,
            digest,
            origin,
        }
    }

    pub fn skill(&self) -> &Arc<dyn Skill> {
        &self.skill
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn origin(&self) -> SkillOrigin {
        self.origin
    }
}

/// Immutable view of every installed skill. Readers hold an `Arc` to one
/// table for as long as they need a consistent picture; writers build a
/// new table and swap it in.
#[derive(Clone, Debug, Default)]
pub struct SkillTable {
    entries: BTreeMap<String, SkillEntry>,
}

impl SkillTable {
    pub fn get(&self, name: &str) -> Option<&SkillEntry> {
        self.entries.get(&canonical(name))
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Skill>> {
        self.get(name).map(|entry| Arc::clone(&entry.skill))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sources(&self) -> SourceMap {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.skill.source().to_string()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillInfo {
    pub name: String,
    pub version: u64,
    pub digest: String,
    pub origin: SkillOrigin,
}

/// Outcome of a successful install. The new skill is live even when
/// `persist_error` is set.
#[derive(Debug)]
pub struct ReplaceReport {
    pub name: String,
    pub version: u64,
    pub digest: String,
    pub persist_error: Option<StoreError>,
}

impl ReplaceReport {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub installed: Vec<String>,
    pub rejected: Vec<(String, RegistryError)>,
    pub store_error: Option<StoreError>,
}

#[derive(Debug)]
pub struct SkillRegistry {
    table: RwLock<Arc<SkillTable>>,
    writer: Mutex<()>,
    generation: AtomicU64,
    store: Arc<dyn SkillStore>,
}

impl SkillRegistry {
    /// Registry holding only the built-in defaults. Nothing is read from
    /// `store` until [`SkillRegistry::load_from_store`].
    pub fn with_defaults(store: Arc<dyn SkillStore>) -> Result<Self, RegistryError> {
        let mut table = SkillTable::default();
        for skill in default_skills()? {
            let name = skill.name().to_string();
            let entry = SkillEntry::new(Arc::new(skill), 1, SkillOrigin::Builtin);
            table.entries.insert(name, entry);
        }
        Ok(Self {
            table: RwLock::new(Arc::new(table)),
            writer: Mutex::new(()),
            generation: AtomicU64::new(0),
            store,
        })
    }

    /// Defaults overlaid with whatever the store holds.
    pub fn open(store: Arc<dyn SkillStore>) -> Result<Self, RegistryError> {
        let registry = Self::with_defaults(store)?;
        registry.load_from_store();
        Ok(registry)
    }

    /// Opens the JSON store named by `SKILL_STORE_PATH`, or the default path.
    pub fn from_env() -> Result<Self, RegistryError> {
        Self::open(Arc::new(JsonFileSkillStore::from_env()))
    }

    pub fn snapshot(&self) -> Arc<SkillTable> {
        let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Skill>> {
        self.snapshot().lookup(name)
    }

    pub fn source_of(&self, name: &str) -> Option<String> {
        self.snapshot()
            .get(name)
            .map(|entry| entry.skill.source().to_string())
    }

    pub fn entries(&self) -> Vec<SkillInfo> {
        self.snapshot()
            .entries
            .iter()
            .map(|(name, entry)| SkillInfo {
                name: name.clone(),
                version: entry.version,
                digest: entry.digest.clone(),
                origin: entry.origin,
            })
            .collect()
    }

    /// Number of installs since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn compile_named(name: &str, source: &str) -> Result<Arc<dyn Skill>, RegistryError> {
        if !valid_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        let skill = skill_script::compile(source).map_err(|source| RegistryError::Compile {
            name: name.to_string(),
            source,
        })?;
        if skill.name() != name {
            return Err(RegistryError::NameMismatch {
                expected: name.to_string(),
                found: skill.name().to_string(),
            });
        }
        Ok(Arc::new(skill))
    }

    fn install(&self, table: SkillTable) {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(table);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Compile `source` and, if it is valid, make it the implementation of
    /// `name` and persist the full source map. On error nothing changes.
    pub fn replace(&self, name: &str, source: &str) -> Result<ReplaceReport, RegistryError> {
        // compile before taking the writer lock; readers never wait on it
        let skill = Self::compile_named(name, source).inspect_err(|e| {
            warn!("rejected replacement for skill `{name}`: {e}");
        })?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*self.snapshot()).clone();
        let version = next.entries.get(name).map_or(1, |e| e.version + 1);
        let entry = SkillEntry::new(skill, version, SkillOrigin::Replaced);
        let digest = entry.digest.clone();
        next.entries.insert(name.to_string(), entry);
        let sources = next.sources();
        self.install(next);
        info!("installed skill `{name}` v{version} ({digest})");

        let persist_error = self.store.save(&sources).err();
        if let Some(e) = &persist_error {
            error!("skill `{name}` is live but could not be persisted: {e}");
        }
        Ok(ReplaceReport {
            name: name.to_string(),
            version,
            digest,
            persist_error,
        })
    }

    /// Overlay persisted sources on the current table. An unreadable store
    /// leaves the table untouched; entries that fail to compile keep
    /// whatever was installed before.
    pub fn load_from_store(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let sources = match self.store.load() {
            Ok(Some(sources)) => sources,
            Ok(None) => {
                debug!("skill store is empty; keeping defaults");
                return report;
            }
            Err(e) => {
                error!("skill store unavailable, keeping defaults: {e}");
                report.store_error = Some(e);
                return report;
            }
        };

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*self.snapshot()).clone();
        for (name, source) in sources {
            let digest = source_digest(&source);
            if next.entries.get(&name).is_some_and(|e| e.digest == digest) {
                continue;
            }
            match Self::compile_named(&name, &source) {
                Ok(skill) => {
                    let version = next.entries.get(&name).map_or(1, |e| e.version + 1);
                    next.entries
                        .insert(name.clone(), SkillEntry::new(skill, version, SkillOrigin::Stored));
                    report.installed.push(name);
                }
                Err(e) => {
                    warn!("ignoring stored skill `{name}`: {e}");
                    report.rejected.push((name, e));
                }
            }
        }
        if !report.installed.is_empty() {
            self.install(next);
            info!("loaded {} skills from store", report.installed.len());
        }
        report
    }
}
