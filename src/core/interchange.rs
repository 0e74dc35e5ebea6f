//! JSON interchange documents.
//!
//! Exports flatten rows into self-contained documents (category names
//! instead of foreign keys, frozen line prices alongside current product
//! data) so a document is readable without the database that produced it.
//! Imports reconcile by natural key before inserting: categories by name,
//! products by (name, category), so re-importing an export is a no-op.

use crate::{
    core::{order, product},
    entities::{Category, Product, category, product as product_entity},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;
use tracing::info;

/// A product flattened for interchange, carrying its category by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub price: f64,
    pub product_quantity: i64,
    pub category_name: String,
    pub image: String,
}

/// A category row for interchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

/// One order line in an exported order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    pub id: i64,
    pub quantity: i64,
    pub price: f64,
    pub product_id: i64,
    pub product_name: String,
    pub product_price: f64,
    pub product_image: String,
}

/// A complete order with its lines and total, self-contained for handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    pub order_id: i64,
    pub order_date: chrono::NaiveDate,
    pub order_status: String,
    pub order_details: Vec<OrderLineRecord>,
    pub total_order_sum: f64,
}

/// Counts of what an import actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Builds interchange records for every product, ordered by name.
pub async fn export_products(db: &DatabaseConnection) -> Result<Vec<ProductRecord>> {
    let categories = Repository::<'_, _, Category>::new(db).all().await?;
    let name_of = |id: i64| {
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .ok_or(Error::NotFound {
                entity: "category",
                key: id.to_string(),
            })
    };

    product::get_all_products(db)
        .await?
        .into_iter()
        .map(|p| {
            Ok(ProductRecord {
                name: p.name,
                price: p.price,
                product_quantity: p.quantity,
                category_name: name_of(p.category_id)?,
                image: p.image,
            })
        })
        .collect()
}

/// Builds interchange records for every category, ordered by name.
pub async fn export_categories(db: &DatabaseConnection) -> Result<Vec<CategoryRecord>> {
    let repo: Repository<'_, _, Category> = Repository::new(db);
    let rows = repo
        .many(repo.query().order_by_asc(category::Column::Name))
        .await?;
    Ok(rows
        .into_iter()
        .map(|c| CategoryRecord {
            id: c.id,
            name: c.name,
        })
        .collect())
}

/// Builds the self-contained document for one order.
pub async fn export_order(db: &DatabaseConnection, order_id: i64) -> Result<OrderDocument> {
    let header = order::get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "order",
            key: order_id.to_string(),
        })?;
    let status = crate::core::status::get_status_by_id(db, header.status_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "status",
            key: header.status_id.to_string(),
        })?;

    let mut details = Vec::new();
    for line in order::line_items_for_order(db, order_id).await? {
        let item = product::get_product_by_id(db, line.product_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "product",
                key: line.product_id.to_string(),
            })?;
        details.push(OrderLineRecord {
            id: line.id,
            quantity: line.quantity,
            price: line.price,
            product_id: item.id,
            product_name: item.name,
            product_price: item.price,
            product_image: item.image,
        });
    }
    let total_order_sum = details.iter().map(|d| d.price).sum();

    Ok(OrderDocument {
        order_id: header.id,
        order_date: header.order_date,
        order_status: status.name,
        order_details: details,
        total_order_sum,
    })
}

async fn find_or_create_category<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<category::Model> {
    let repo: Repository<'_, _, Category> = Repository::new(conn);
    if let Some(existing) = repo
        .one(repo.query().filter(category::Column::Name.eq(name)))
        .await?
    {
        return Ok(existing);
    }
    repo.insert(category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    })
    .await
}

/// Imports product records in one unit of work.
///
/// Missing categories are created by name; a record whose (name, category)
/// already exists is skipped, leaving the stored row untouched. A record
/// with an invalid price or quantity aborts the whole import.
pub async fn import_products(
    db: &DatabaseConnection,
    records: &[ProductRecord],
) -> Result<ImportSummary> {
    let uow = UnitOfWork::begin(db).await?;
    let mut summary = ImportSummary::default();

    for record in records {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(Error::Validation {
                message: "Imported product name cannot be empty".to_string(),
            });
        }
        if record.price < 0.0 || !record.price.is_finite() {
            return Err(Error::InvalidPrice {
                price: record.price,
            });
        }
        if record.product_quantity < 0 {
            return Err(Error::InvalidQuantity {
                quantity: record.product_quantity,
            });
        }

        let home = find_or_create_category(uow.conn(), record.category_name.trim()).await?;
        if product::find_product(uow.conn(), name, home.id)
            .await?
            .is_some()
        {
            summary.skipped += 1;
            continue;
        }

        uow.repo::<Product>()
            .insert(product_entity::ActiveModel {
                name: Set(name.to_string()),
                price: Set(record.price),
                image: Set(record.image.clone()),
                quantity: Set(record.product_quantity),
                category_id: Set(home.id),
                ..Default::default()
            })
            .await?;
        summary.inserted += 1;
    }

    uow.commit().await?;
    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Imported products"
    );
    Ok(summary)
}

/// Imports category records, reconciling by name; ids in the records are
/// advisory and never forced onto the table.
pub async fn import_categories(
    db: &DatabaseConnection,
    records: &[CategoryRecord],
) -> Result<ImportSummary> {
    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Category>();
    let mut summary = ImportSummary::default();

    for record in records {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(Error::Validation {
                message: "Imported category name cannot be empty".to_string(),
            });
        }

        let existing = repo
            .one(repo.query().filter(category::Column::Name.eq(name)))
            .await?;
        if existing.is_some() {
            summary.skipped += 1;
            continue;
        }

        repo.insert(category::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        })
        .await?;
        summary.inserted += 1;
    }

    uow.commit().await?;
    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Imported categories"
    );
    Ok(summary)
}

/// Serializes a document to pretty-printed JSON on disk.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Deserializes a document from a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
