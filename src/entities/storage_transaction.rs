//! Storage transaction entity - One row in the append-only stock ledger.
//!
//! Each row records a signed quantity delta against a product, classified by
//! a transaction type. Rows are write-once: no update or delete operation is
//! exposed anywhere in the engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock ledger database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_transactions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable description of the movement
    pub description: String,
    /// Signed quantity change applied to the product's stock
    pub quantity_delta: i64,
    /// ID of the product whose stock moved
    pub product_id: i64,
    /// ID of the classifying transaction type
    pub transaction_type_id: i64,
    /// When the entry was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between StorageTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each ledger entry is classified by one transaction type
    #[sea_orm(
        belongs_to = "super::transaction_type::Entity",
        from = "Column::TransactionTypeId",
        to = "super::transaction_type::Column::Id"
    )]
    TransactionType,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::transaction_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
