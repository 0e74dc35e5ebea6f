//! Status entity - A workflow state an order can be in.
//!
//! Each status carries a stable `code` the fulfillment workflow matches on,
//! separate from the editable display `name`. Renaming a status row can never
//! break the terminal-state check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    /// Unique identifier for the status
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stable workflow tag, e.g. "gathering" or "delivered"
    #[sea_orm(unique)]
    pub code: String,
    /// Unique, editable display name (e.g., "Gathering at warehouse")
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Status and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One status applies to many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
