use crate::error::{MigrateError, MigrateResult};
use crate::sql::quote_ident;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Contents of a model definition file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelDefinition {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
}

/// A resolved model, shared by every unit of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    name: String,
    definition: Arc<ModelDefinition>,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, definition: ModelDefinition) -> Self {
        Self {
            name: name.into(),
            definition: Arc::new(definition),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quoted `schema.table` (or just `table`) for use in SQL
    pub fn qualified_table(&self) -> String {
        match &self.definition.schema {
            Some(schema) => format!(
                "{}.{}",
                quote_ident(schema),
                quote_ident(&self.definition.table)
            ),
            None => quote_ident(&self.definition.table),
        }
    }
}

pub trait ModelLoader: Send + Sync {
    /// Load the model `name` whose configured descriptor is `descriptor`
    fn load(&self, name: &str, descriptor: &str) -> Result<ModelDefinition>;
}

/// Reads model definitions (YAML or JSON) relative to the config directory
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    root_dir: PathBuf,
}

impl FileModelLoader {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self, name: &str, descriptor: &str) -> Result<ModelDefinition> {
        let path = self.root_dir.join(descriptor);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;

        let definition: ModelDefinition = if is_json(&path) {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };

        debug!("Loaded model '{}' from {}", name, path.display());
        Ok(definition)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Lazily resolves model names against the configured `models` mapping.
/// A model is loaded at most once per resolver.
pub struct ModelResolver {
    descriptors: BTreeMap<String, String>,
    loader: Arc<dyn ModelLoader>,
    cache: Mutex<HashMap<String, ModelHandle>>,
}

impl ModelResolver {
    pub fn new(descriptors: BTreeMap<String, String>, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            descriptors,
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn model(&self, name: &str) -> MigrateResult<ModelHandle> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = cache.get(name) {
            return Ok(handle.clone());
        }

        let descriptor = self
            .descriptors
            .get(name)
            .ok_or_else(|| MigrateError::ModelNotFound {
                name: name.to_string(),
            })?;

        let definition =
            self.loader
                .load(name, descriptor)
                .map_err(|e| MigrateError::ModelLoad {
                    name: name.to_string(),
                    source: e.into(),
                })?;

        let handle = ModelHandle::new(name, definition);
        cache.insert(name.to_string(), handle.clone());
        Ok(handle)
    }
}
