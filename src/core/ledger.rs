//! Stock ledger rules.
//!
//! Every stock movement outside of order delivery goes through
//! [`record_adjustment`]: the product quantity change and the ledger row
//! describing it land in the same unit of work, so the ledger never drifts
//! from the stock it explains. Negative deltas use the same guarded update
//! as delivery, keeping quantities non-negative under concurrent writers.

use crate::{
    core::transaction_type,
    entities::{Product, StorageTransaction, product, storage_transaction},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

/// Retrieves the full ledger, newest entries first.
pub async fn get_all_entries(
    db: &DatabaseConnection,
) -> Result<Vec<storage_transaction::Model>> {
    let repo: Repository<'_, _, StorageTransaction> = Repository::new(db);
    repo.many(
        repo.query()
            .order_by_desc(storage_transaction::Column::RecordedAt)
            .order_by_desc(storage_transaction::Column::Id),
    )
    .await
}

/// Retrieves one product's ledger entries, newest first.
pub async fn history_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
) -> Result<Vec<storage_transaction::Model>> {
    let repo: Repository<'_, _, StorageTransaction> = Repository::new(conn);
    repo.many(
        repo.query()
            .filter(storage_transaction::Column::ProductId.eq(product_id))
            .order_by_desc(storage_transaction::Column::RecordedAt)
            .order_by_desc(storage_transaction::Column::Id),
    )
    .await
}

/// Applies a signed quantity delta to a product and appends the ledger entry
/// describing it, atomically.
///
/// A zero delta is rejected as meaningless. A negative delta that would push
/// the product's stock below zero aborts with `InsufficientStock` and
/// changes nothing. The classification is resolved by name, created on the
/// fly if missing.
pub async fn record_adjustment(
    db: &DatabaseConnection,
    product_id: i64,
    delta: i64,
    type_name: &str,
    description: String,
) -> Result<storage_transaction::Model> {
    use sea_orm::sea_query::Expr;

    if delta == 0 {
        return Err(Error::InvalidQuantity { quantity: 0 });
    }

    let uow = UnitOfWork::begin(db).await?;

    let item = uow
        .repo::<Product>()
        .by_id(product_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "product",
            key: product_id.to_string(),
        })?;

    // Guarded single-statement update: the floor filter only binds when the
    // delta is negative, an increment always applies.
    let mut update = Product::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).add(delta),
        )
        .filter(product::Column::Id.eq(product_id));
    if delta < 0 {
        update = update.filter(product::Column::Quantity.gte(-delta));
    }
    let result = update.exec(uow.conn()).await?;
    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            product: item.name,
            available: item.quantity,
            requested: -delta,
        });
    }

    let classification = transaction_type::find_or_create(uow.conn(), type_name).await?;

    let entry = uow
        .repo::<StorageTransaction>()
        .insert(storage_transaction::ActiveModel {
            description: Set(description),
            quantity_delta: Set(delta),
            product_id: Set(product_id),
            transaction_type_id: Set(classification.id),
            recorded_at: Set(chrono::Utc::now()),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(
        product_id,
        delta,
        kind = type_name,
        "Recorded stock adjustment"
    );
    Ok(entry)
}
