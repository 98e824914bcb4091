use super::sections::{SqlScript, parse_sql_script};
use crate::constants::{MODEL_PLACEHOLDER_CLOSE, MODEL_PLACEHOLDER_OPEN, SQL_UNIT_EXTENSION};
use crate::error::MigrateResult;
use crate::migration::ParsedUnit;
use crate::unit::{MigrationUnit, UnitContext, UnitFuture, UnitLoader};
use anyhow::{Context, Result, bail};
use futures_util::FutureExt;
use sqlx::{Executor, PgConnection, PgPool};
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads `.sql` units that run against one environment's pool
#[derive(Debug, Clone)]
pub struct SqlUnitLoader {
    pool: PgPool,
}

impl SqlUnitLoader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UnitLoader for SqlUnitLoader {
    fn load(&self, unit: &ParsedUnit) -> Result<Arc<dyn MigrationUnit>> {
        if unit.path.extension().is_none_or(|ext| ext != SQL_UNIT_EXTENSION) {
            bail!(
                "Unsupported migration file type (expected .{})",
                SQL_UNIT_EXTENSION
            );
        }

        let sql = std::fs::read_to_string(&unit.path)
            .with_context(|| format!("Failed to read migration file: {}", unit.path.display()))?;
        let script = parse_sql_script(&sql)
            .with_context(|| format!("Failed to parse migration {}", unit.name))?;

        Ok(Arc::new(SqlUnit {
            name: unit.name.clone(),
            script,
            pool: self.pool.clone(),
        }))
    }
}

pub struct SqlUnit {
    name: String,
    script: SqlScript,
    pool: PgPool,
}

impl SqlUnit {
    async fn execute(&self, section: &str, sql: &str, ctx: &UnitContext) -> Result<()> {
        let sql = expand_model_placeholders(sql, |name| {
            let model = ctx.model(name)?;
            let table = model.qualified_table();
            debug!("Model {} resolves to {} in {}", model.name(), table, self.name);
            Ok(table)
        })?;

        if sql.trim().is_empty() {
            warn!("Migration {} has an empty {} section", self.name, section);
            return Ok(());
        }

        debug!("Executing {} section of {}", section, self.name);
        // Explicit executor types keep the boxed future `Send`
        if self.script.transactional {
            let mut tx = self.pool.begin().await?;
            let conn: &mut PgConnection = &mut tx;
            Executor::execute(conn, sqlx::raw_sql(&sql)).await?;
            tx.commit().await?;
        } else {
            Executor::execute(&self.pool, sqlx::raw_sql(&sql)).await?;
        }

        Ok(())
    }
}

impl MigrationUnit for SqlUnit {
    fn up<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a> {
        self.execute("up", &self.script.up, ctx).boxed()
    }

    fn down<'a>(&'a self, ctx: &'a UnitContext) -> UnitFuture<'a> {
        async move {
            let Some(down) = &self.script.down else {
                bail!(
                    "Migration {} has no down section and cannot be reverted",
                    self.name
                );
            };
            self.execute("down", down, ctx).await
        }
        .boxed()
    }
}

/// Replace every `{{model:NAME}}` with whatever `resolve` returns for NAME
pub fn expand_model_placeholders<F>(sql: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(&str) -> MigrateResult<String>,
{
    let mut expanded = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(start) = rest.find(MODEL_PLACEHOLDER_OPEN) {
        expanded.push_str(&rest[..start]);
        let after_open = &rest[start + MODEL_PLACEHOLDER_OPEN.len()..];

        let Some(end) = after_open.find(MODEL_PLACEHOLDER_CLOSE) else {
            bail!("Unterminated model placeholder near '{}'", &rest[start..]);
        };

        let name = after_open[..end].trim();
        expanded.push_str(&resolve(name)?);
        rest = &after_open[end + MODEL_PLACEHOLDER_CLOSE.len()..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}
