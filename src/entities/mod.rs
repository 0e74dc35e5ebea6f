//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.
//!
//! Relationships are unidirectional: child rows hold foreign-key columns and
//! are resolved through queries, never through mutable back-pointers.

pub mod category;
pub mod order;
pub mod order_details;
pub mod product;
pub mod status;
pub mod storage_transaction;
pub mod transaction_type;
pub mod user;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_details::{
    Column as OrderDetailsColumn, Entity as OrderDetails, Model as OrderDetailsModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use status::{Column as StatusColumn, Entity as Status, Model as StatusModel};
pub use storage_transaction::{
    Column as StorageTransactionColumn, Entity as StorageTransaction,
    Model as StorageTransactionModel,
};
pub use transaction_type::{
    Column as TransactionTypeColumn, Entity as TransactionType, Model as TransactionTypeModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
