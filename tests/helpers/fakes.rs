use anyhow::{Result, bail};
use futures_util::FutureExt;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stepmigrate::config::load_config;
use stepmigrate::error::{MigrateError, MigrateResult};
use stepmigrate::migration::ParsedUnit;
use stepmigrate::state::StateStore;
use stepmigrate::unit::{
    MigrationUnit, ModelDefinition, ModelLoader, ModelResolver, UnitContext, UnitFuture,
    UnitLoader,
};

/// Shared record of every entry point invoked, e.g. "up:100"
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// What a fake unit does when invoked
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
    Hang,
    /// Resolve a model and record its table
    UseModel(String),
    /// Fail unless the config file on disk holds this marker
    ExpectPersistedMarker(PathBuf, i64),
}

pub struct FakeUnit {
    key: i64,
    behavior: Behavior,
    journal: Journal,
}

impl FakeUnit {
    async fn execute(&self, direction: &str, ctx: &UnitContext) -> Result<()> {
        self.journal.record(format!("{}:{}", direction, self.key));

        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => bail!("unit {} refused to run", self.key),
            Behavior::Panic => panic!("unit {} panicked", self.key),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Behavior::UseModel(name) => {
                let model = ctx.model(name)?;
                self.journal.record(format!("model:{}", model.qualified_table()));
                Ok(())
            }
            Behavior::ExpectPersistedMarker(path, expected) => {
                let (config, _) = load_config(path)?;
                let actual = config.marker_for(ctx.environment());
                if actual != *expected {
                    bail!("expected persisted marker {}, found {}", expected, actual);
                }
                Ok(())
            }
        }
    }
}

impl MigrationUnit for FakeUnit {
    fn up<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a> {
        self.execute("up", ctx).boxed()
    }

    fn down<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a> {
        self.execute("down", ctx).boxed()
    }
}

/// Hands out fake units; keys without a configured behavior succeed
#[derive(Default)]
pub struct FakeLoader {
    pub journal: Journal,
    behaviors: HashMap<i64, Behavior>,
    unloadable: Vec<i64>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, key: i64, behavior: Behavior) -> Self {
        self.behaviors.insert(key, behavior);
        self
    }

    pub fn with_unloadable(mut self, key: i64) -> Self {
        self.unloadable.push(key);
        self
    }
}

impl UnitLoader for FakeLoader {
    fn load(&self, unit: &ParsedUnit) -> Result<Arc<dyn MigrationUnit>> {
        if self.unloadable.contains(&unit.key) {
            bail!("cannot load {}", unit.name);
        }

        Ok(Arc::new(FakeUnit {
            key: unit.key,
            behavior: self
                .behaviors
                .get(&unit.key)
                .cloned()
                .unwrap_or(Behavior::Succeed),
            journal: self.journal.clone(),
        }))
    }
}

/// In-memory marker store that can be told to fail a given write
#[derive(Debug, Default)]
pub struct MemoryStore {
    markers: HashMap<String, i64>,
    pub writes: Vec<(String, i64)>,
    fail_on_write: Option<usize>,
}

impl MemoryStore {
    pub fn with_marker(environment: &str, marker: i64) -> Self {
        Self {
            markers: HashMap::from([(environment.to_string(), marker)]),
            ..Self::default()
        }
    }

    /// Make the n-th write (1-indexed) fail
    pub fn failing_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }
}

impl StateStore for MemoryStore {
    fn read(&self, environment: &str) -> MigrateResult<i64> {
        Ok(self.markers.get(environment).copied().unwrap_or(0))
    }

    fn write(&mut self, environment: &str, marker: i64) -> MigrateResult<()> {
        if self.fail_on_write == Some(self.writes.len() + 1) {
            return Err(MigrateError::persistence(
                environment,
                marker,
                std::io::Error::other("disk full"),
            ));
        }
        self.writes.push((environment.to_string(), marker));
        self.markers.insert(environment.to_string(), marker);
        Ok(())
    }
}

/// Models named in the map resolve to a table of the same name in `app`
pub struct StaticModels;

impl ModelLoader for StaticModels {
    fn load(&self, name: &str, _descriptor: &str) -> Result<ModelDefinition> {
        Ok(ModelDefinition {
            table: name.to_string(),
            schema: Some("app".to_string()),
        })
    }
}

pub fn models(names: &[&str]) -> Arc<ModelResolver> {
    let descriptors: BTreeMap<String, String> = names
        .iter()
        .map(|n| (n.to_string(), format!("models/{}.yaml", n)))
        .collect();
    Arc::new(ModelResolver::new(descriptors, Arc::new(StaticModels)))
}

pub fn units(keys: &[i64]) -> Vec<ParsedUnit> {
    keys.iter()
        .map(|key| ParsedUnit {
            path: Path::new("migrations").join(format!("{}-unit.sql", key)),
            key: *key,
            name: format!("{}-unit.sql", key),
            slug: "unit".to_string(),
        })
        .collect()
}
