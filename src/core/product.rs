//! Product catalog rules.
//!
//! A product's name must be unique within its category, its price finite and
//! non-negative, and its stock quantity non-negative. Edits run the same
//! checks excluding the product's own id, so a product can be saved under its
//! current name. Deletes cascade to ledger entries and order line items at
//! the storage layer.

use crate::{
    entities::{Category, Product, product},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, Set,
};
use tracing::info;

/// Retrieves all products ordered alphabetically by name.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    let repo: Repository<'_, _, Product> = Repository::new(db);
    repo.many(repo.query().order_by_asc(product::Column::Name))
        .await
}

/// Retrieves a product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Repository::<'_, _, Product>::new(db).by_id(product_id).await
}

/// Retrieves the products belonging to one category, ordered by name.
pub async fn get_products_in_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<product::Model>> {
    let repo: Repository<'_, _, Product> = Repository::new(db);
    repo.many(
        repo.query()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_asc(product::Column::Name),
    )
    .await
}

/// Finds a product by name within a category.
pub async fn find_product<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    category_id: i64,
) -> Result<Option<product::Model>> {
    let repo: Repository<'_, _, Product> = Repository::new(conn);
    repo.one(
        repo.query()
            .filter(product::Column::Name.eq(name))
            .filter(product::Column::CategoryId.eq(category_id)),
    )
    .await
}

fn validate_fields(name: &str, price: f64, quantity: i64) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidPrice { price });
    }
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Creates a new product in a category.
///
/// Rejects a (name, category) pair that already exists, a missing category,
/// and negative or non-finite price/quantity. The existing product is left
/// unchanged on rejection.
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    price: f64,
    image: String,
    quantity: i64,
    category_id: i64,
) -> Result<product::Model> {
    let name = name.trim().to_string();
    validate_fields(&name, price, quantity)?;

    let uow = UnitOfWork::begin(db).await?;

    let category = uow
        .repo::<Category>()
        .by_id(category_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "category",
            key: category_id.to_string(),
        })?;

    if find_product(uow.conn(), &name, category_id).await?.is_some() {
        return Err(Error::DuplicateProduct {
            name,
            category: category.name,
        });
    }

    let created = uow
        .repo::<Product>()
        .insert(product::ActiveModel {
            name: Set(name),
            price: Set(price),
            image: Set(image),
            quantity: Set(quantity),
            category_id: Set(category_id),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(
        id = created.id,
        name = %created.name,
        quantity = created.quantity,
        "Created product"
    );
    Ok(created)
}

/// Updates a product's fields, running the same checks as creation but
/// excluding the product's own id from the uniqueness lookup.
///
/// The id is preserved, so attached ledger entries and order line items keep
/// pointing at the product.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    name: String,
    price: f64,
    image: String,
    quantity: i64,
    category_id: i64,
) -> Result<product::Model> {
    let name = name.trim().to_string();
    validate_fields(&name, price, quantity)?;

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Product>();

    let existing = repo.by_id(product_id).await?.ok_or(Error::NotFound {
        entity: "product",
        key: product_id.to_string(),
    })?;

    let category = uow
        .repo::<Category>()
        .by_id(category_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "category",
            key: category_id.to_string(),
        })?;

    let clash = repo
        .one(
            repo.query()
                .filter(product::Column::Name.eq(name.as_str()))
                .filter(product::Column::CategoryId.eq(category_id))
                .filter(product::Column::Id.ne(product_id)),
        )
        .await?;
    if clash.is_some() {
        return Err(Error::DuplicateProduct {
            name,
            category: category.name,
        });
    }

    let mut active: product::ActiveModel = existing.into();
    active.name = Set(name);
    active.price = Set(price);
    active.image = Set(image);
    active.quantity = Set(quantity);
    active.category_id = Set(category_id);
    let updated = repo.update(active).await?;
    uow.commit().await?;

    info!(id = updated.id, name = %updated.name, "Updated product");
    Ok(updated)
}

/// Deletes a product; dependent ledger entries and line items cascade at the
/// storage layer.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Product>();

    let existing = repo.by_id(product_id).await?.ok_or(Error::NotFound {
        entity: "product",
        key: product_id.to_string(),
    })?;

    repo.delete(existing).await?;
    uow.commit().await?;

    info!(id = product_id, "Deleted product");
    Ok(())
}
