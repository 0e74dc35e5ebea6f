//! Workflow seed data loading from config.toml.
//!
//! The fulfillment workflow needs its two distinguished status rows
//! ("gathering", "delivered") and a baseline set of ledger transaction types
//! to exist before any order can be created. They are seeded from a TOML file
//! when present, or from built-in defaults, and seeding is idempotent:
//! existing rows are matched by stable code (statuses) or name (types) and
//! left untouched.

use crate::core::status::StatusCode;
use crate::entities::{Status, TransactionType, status, transaction_type};
use crate::errors::{Error, Result};
use crate::repo::Repository;
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Status rows to seed
    #[serde(default)]
    pub statuses: Vec<StatusConfig>,
    /// Transaction type rows to seed
    #[serde(default)]
    pub transaction_types: Vec<TransactionTypeConfig>,
}

/// Configuration for a single status row
#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    /// Stable workflow tag
    pub code: String,
    /// Editable display name
    pub name: String,
}

/// Configuration for a single transaction type row
#[derive(Debug, Deserialize, Clone)]
pub struct TransactionTypeConfig {
    /// Unique classifying name
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            statuses: vec![
                StatusConfig {
                    code: StatusCode::Gathering.as_str().to_string(),
                    name: "Gathering at warehouse".to_string(),
                },
                StatusConfig {
                    code: StatusCode::Delivered.as_str().to_string(),
                    name: "Delivered".to_string(),
                },
            ],
            transaction_types: vec![
                TransactionTypeConfig {
                    name: "restock".to_string(),
                },
                TransactionTypeConfig {
                    name: "sale".to_string(),
                },
                TransactionTypeConfig {
                    name: "adjustment".to_string(),
                },
            ],
        }
    }
}

/// Loads workflow configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from ./config.toml, falling back to built-in defaults
/// when the file does not exist.
pub fn load_or_default() -> Result<Config> {
    if Path::new("config.toml").exists() {
        load_config("config.toml")
    } else {
        Ok(Config::default())
    }
}

/// Seeds missing status and transaction type rows.
///
/// Statuses are matched by code, transaction types by name; rows that already
/// exist keep whatever display name the user has edited them to.
pub async fn seed_workflow_rows(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let statuses: Repository<'_, _, Status> = Repository::new(db);
    for entry in &config.statuses {
        let existing = statuses
            .one(statuses.query().filter(status::Column::Code.eq(entry.code.as_str())))
            .await?;
        if existing.is_none() {
            statuses
                .insert(status::ActiveModel {
                    code: Set(entry.code.clone()),
                    name: Set(entry.name.clone()),
                    ..Default::default()
                })
                .await?;
            info!(code = %entry.code, name = %entry.name, "Seeded status");
        }
    }

    let types: Repository<'_, _, TransactionType> = Repository::new(db);
    for entry in &config.transaction_types {
        let existing = types
            .one(
                types
                    .query()
                    .filter(transaction_type::Column::Name.eq(entry.name.as_str())),
            )
            .await?;
        if existing.is_none() {
            types
                .insert(transaction_type::ActiveModel {
                    name: Set(entry.name.clone()),
                    ..Default::default()
                })
                .await?;
            info!(name = %entry.name, "Seeded transaction type");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::fresh_db;

    #[test]
    fn test_parse_workflow_config() {
        let toml_str = r#"
            [[statuses]]
            code = "gathering"
            name = "Gathering at warehouse"

            [[statuses]]
            code = "delivered"
            name = "Delivered"

            [[transaction_types]]
            name = "restock"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.statuses.len(), 2);
        assert_eq!(config.statuses[0].code, "gathering");
        assert_eq!(config.statuses[1].name, "Delivered");
        assert_eq!(config.transaction_types.len(), 1);
    }

    #[test]
    fn test_default_config_covers_workflow_codes() {
        let config = Config::default();
        assert!(
            config
                .statuses
                .iter()
                .any(|s| s.code == StatusCode::Gathering.as_str())
        );
        assert!(
            config
                .statuses
                .iter()
                .any(|s| s.code == StatusCode::Delivered.as_str())
        );
    }

    #[tokio::test]
    async fn test_seed_workflow_rows_is_idempotent() -> Result<()> {
        let db = fresh_db().await?;

        let config = Config::default();
        seed_workflow_rows(&db, &config).await?;
        seed_workflow_rows(&db, &config).await?;

        let statuses: Repository<'_, _, Status> = Repository::new(&db);
        assert_eq!(statuses.all().await?.len(), 2);

        let types: Repository<'_, _, TransactionType> = Repository::new(&db);
        assert_eq!(types.all().await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_preserves_renamed_display_name() -> Result<()> {
        let db = fresh_db().await?;
        seed_workflow_rows(&db, &Config::default()).await?;

        // Rename the delivered status's display name, then reseed.
        let statuses: Repository<'_, _, Status> = Repository::new(&db);
        let delivered = statuses
            .one(
                statuses
                    .query()
                    .filter(status::Column::Code.eq(StatusCode::Delivered.as_str())),
            )
            .await?
            .unwrap();
        let mut active: status::ActiveModel = delivered.into();
        active.name = Set("Handed over".to_string());
        statuses.update(active).await?;

        seed_workflow_rows(&db, &Config::default()).await?;

        let delivered = statuses
            .one(
                statuses
                    .query()
                    .filter(status::Column::Code.eq(StatusCode::Delivered.as_str())),
            )
            .await?
            .unwrap();
        assert_eq!(delivered.name, "Handed over");

        Ok(())
    }
}
