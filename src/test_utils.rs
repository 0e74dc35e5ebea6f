//! Shared helpers for unit tests: an in-memory database with the schema and
//! workflow rows in place, plus fixture builders for the common entities.

use crate::{
    config::{database::create_tables, workflow},
    core::{category, order, product},
    entities::{category as category_entity, order as order_entity, product as product_entity},
    errors::Result,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Connects an isolated in-memory SQLite database with the schema created
/// but nothing seeded.
///
/// The pool is capped at one connection: each pooled connection to
/// `sqlite::memory:` would otherwise get its own empty database.
pub async fn fresh_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// An in-memory database with every table created and the workflow statuses
/// and transaction types seeded from the default config.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = fresh_db().await?;
    workflow::seed_workflow_rows(&db, &workflow::Config::default()).await?;
    Ok(db)
}

/// A fixed order date so assertions never depend on the clock.
#[must_use]
pub fn test_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default()
}

pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category_entity::Model> {
    category::create_category(db, name.to_string()).await
}

/// A product with the default fixture shape: price 50.0, stock 10.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    category_id: i64,
) -> Result<product_entity::Model> {
    create_custom_product(db, name, 50.0, 10, category_id).await
}

pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    quantity: i64,
    category_id: i64,
) -> Result<product_entity::Model> {
    product::create_product(
        db,
        name.to_string(),
        price,
        format!("{}.png", name.to_lowercase()),
        quantity,
        category_id,
    )
    .await
}

pub async fn create_test_order(db: &DatabaseConnection) -> Result<order_entity::Model> {
    order::create_order(db, test_date()).await
}

/// Database plus one "Shoes" category.
pub async fn setup_with_category() -> Result<(DatabaseConnection, category_entity::Model)> {
    let db = setup_test_db().await?;
    let shoes = create_test_category(&db, "Shoes").await?;
    Ok((db, shoes))
}

/// Database, "Shoes" category, and a "Runner" product (price 50.0, stock 10).
pub async fn setup_with_product() -> Result<(
    DatabaseConnection,
    category_entity::Model,
    product_entity::Model,
)> {
    let (db, shoes) = setup_with_category().await?;
    let runner = create_test_product(&db, "Runner", shoes.id).await?;
    Ok((db, shoes, runner))
}
