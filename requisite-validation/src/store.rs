//! Rule set sources.
//!
//! A [`RuleStore`] hands out parsed collections: JSON objects mapping rule
//! set names to their definitions. [`FileRuleStore`] reads them from a base
//! directory, [`MemoryRuleStore`] keeps them in memory.

use crate::loader::{COLLECTION_SUFFIX, FileFormat, RuleLoader};
use crate::{RequirementsError, RequirementsOptions, Result, RuleSet, RuleSetKey};
use requisite_core::logging::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub trait RuleStore: Send + Sync {
    /// Collection document holding the rule set `key` names
    fn collection(&self, key: &RuleSetKey) -> Result<Arc<Value>>;

    /// Resolve `key` into an owned, typed rule set
    fn resolve(&self, key: &RuleSetKey, options: &RequirementsOptions) -> Result<RuleSet> {
        let collection = self.collection(key)?;
        let definition = collection
            .get(key.name())
            .ok_or_else(|| RequirementsError::RuleSetNotFound {
                location: key.location(),
                name: key.name().to_string(),
            })?;

        let rule_set = RuleSet::from_value(key.clone(), definition, options)?;
        debug!(
            key = %key,
            location = %key.location(),
            properties = rule_set.property_count(),
            "Resolved rule set"
        );
        Ok(rule_set)
    }
}

/// Collections stored as `{base}/{location}.req.json` (or `.req.toml`),
/// loaded once and cached.
#[derive(Debug)]
pub struct FileRuleStore {
    base: PathBuf,
    cache: RwLock<HashMap<PathBuf, Arc<Value>>>,
}

impl FileRuleStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// First existing collection file for `key`, JSON before TOML
    pub fn collection_path(&self, key: &RuleSetKey) -> Option<PathBuf> {
        let (file, dirs) = key.collection().split_last()?;
        let mut dir = self.base.clone();
        dir.extend(dirs);

        FileFormat::ALL.iter().find_map(|format| {
            let path = dir.join(format!("{}.{}.{}", file, COLLECTION_SUFFIX, format.extension()));
            path.is_file().then_some(path)
        })
    }

    /// Drop every cached collection
    pub fn invalidate(&self) {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn cached(&self, path: &Path) -> Option<Arc<Value>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }
}

impl RuleStore for FileRuleStore {
    fn collection(&self, key: &RuleSetKey) -> Result<Arc<Value>> {
        let path = self
            .collection_path(key)
            .ok_or_else(|| RequirementsError::Load {
                path: self.base.join(format!("{}.{}.json", key.location(), COLLECTION_SUFFIX)),
                reason: "no collection file found".to_string(),
            })?;

        if let Some(collection) = self.cached(&path) {
            return Ok(collection);
        }

        let collection = Arc::new(RuleLoader::auto(&path)?.load_file(&path)?);
        debug!(path = %path.display(), "Loaded rule set collection");

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cache.entry(path).or_insert(collection).clone())
    }
}

/// Collections held in memory, keyed by location (`route`, `admin/users`).
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    collections: RwLock<HashMap<String, Arc<Value>>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection. The root must be an object.
    pub fn insert_collection(&self, location: impl Into<String>, collection: Value) -> Result<()> {
        let location = location.into();
        if !collection.is_object() {
            return Err(RequirementsError::Parse {
                path: PathBuf::from(&location),
                reason: "collection root must be an object".to_string(),
            });
        }

        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(location, Arc::new(collection));
        Ok(())
    }

    pub fn with_collection(self, location: impl Into<String>, collection: Value) -> Result<Self> {
        self.insert_collection(location, collection)?;
        Ok(self)
    }
}

impl RuleStore for MemoryRuleStore {
    fn collection(&self, key: &RuleSetKey) -> Result<Arc<Value>> {
        let location = key.location();
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&location)
            .cloned()
            .ok_or_else(|| RequirementsError::Load {
                path: PathBuf::from(location),
                reason: "collection not registered".to_string(),
            })
    }
}
