//! Transaction type entity - Classifies stock ledger entries.
//!
//! Types are user-defined rows with unique names, e.g. "restock", "sale",
//! "adjustment".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction type database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_types")]
pub struct Model {
    /// Unique identifier for the transaction type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique classifying name
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between TransactionType and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type classifies many ledger entries
    #[sea_orm(has_many = "super::storage_transaction::Entity")]
    StorageTransactions,
}

impl Related<super::storage_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
