//! Database configuration module.
//!
//! Handles `SQLite` connection and table creation using `SeaORM`. Table
//! creation uses `Schema::create_table_from_entity` to generate SQL from the
//! entity definitions, so the schema always matches the Rust structs without
//! hand-written migrations.

use crate::entities::{
    Category, Order, OrderDetails, Product, Status, StorageTransaction, TransactionType, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// `SQLite` path.
pub fn get_database_url() -> String {
    // mode=rwc lets SQLite create the file on first run.
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/stockroom.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`,
/// falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Foreign keys and cascade actions come from the entities' relation
/// attributes, so referential behavior (e.g. line items cascading with their
/// order) is enforced by the storage engine.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut product_table = schema.create_table_from_entity(Product);
    let mut transaction_type_table = schema.create_table_from_entity(TransactionType);
    let mut storage_transaction_table = schema.create_table_from_entity(StorageTransaction);
    let mut status_table = schema.create_table_from_entity(Status);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut order_details_table = schema.create_table_from_entity(OrderDetails);
    let mut user_table = schema.create_table_from_entity(User);

    // Rerunning bootstrap against an existing database is a no-op.
    db.execute(builder.build(category_table.if_not_exists()))
        .await?;
    db.execute(builder.build(product_table.if_not_exists()))
        .await?;
    db.execute(builder.build(transaction_type_table.if_not_exists()))
        .await?;
    db.execute(builder.build(storage_transaction_table.if_not_exists()))
        .await?;
    db.execute(builder.build(status_table.if_not_exists()))
        .await?;
    db.execute(builder.build(order_table.if_not_exists())).await?;
    db.execute(builder.build(order_details_table.if_not_exists()))
        .await?;
    db.execute(builder.build(user_table.if_not_exists())).await?;

    Ok(())
}
