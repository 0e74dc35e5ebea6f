//! User entity - Authentication records.
//!
//! Consumed only as a yes/no admin gate by callers; no other part of the
//! engine reads this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login name
    #[sea_orm(unique)]
    pub login: String,
    /// Password (plaintext comparison at the collaborator boundary)
    pub password: String,
    /// Whether the user routes to the admin view
    pub is_admin: bool,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
