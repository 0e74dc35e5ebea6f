//! Product entity - A stocked catalog item.
//!
//! Products belong to exactly one category and carry the live stock quantity
//! that fulfillment decrements. The (name, category) pair is unique, enforced
//! by the rule layer rather than a column constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name, unique within its category
    pub name: String,
    /// Unit price, non-negative
    pub price: f64,
    /// Opaque image reference or path
    pub image: String,
    /// Current stock quantity, never negative
    pub quantity: i64,
    /// ID of the owning category
    pub category_id: i64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    /// One product has many ledger entries
    #[sea_orm(has_many = "super::storage_transaction::Entity")]
    StorageTransactions,
    /// One product appears in many order line items
    #[sea_orm(has_many = "super::order_details::Entity")]
    OrderDetails,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::storage_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageTransactions.def()
    }
}

impl Related<super::order_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
