//! Order fulfillment state machine.
//!
//! An order is created in the "gathering" status, accumulates line items
//! whose prices are frozen at attach time, and is fulfilled by
//! [`deliver_order`], which decrements product stock for every line item in
//! one atomic unit of work. Delivery is a one-way gate: a delivered order
//! accepts no further line-item or status changes, and re-delivering is a
//! no-op rather than a repeated decrement.
//!
//! Stock decrements are guarded single-statement updates
//! (`quantity = quantity - ? WHERE quantity >= ?`) so a concurrent writer
//! can never drive a quantity negative through a lost update.

use crate::{
    core::status::{self, StatusCode},
    core::transaction_type,
    entities::{Order, OrderDetails, Product, StorageTransaction, order, order_details, product,
        storage_transaction},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};

/// Ledger classification applied to delivery decrements.
const DELIVERY_LEDGER_TYPE: &str = "sale";

/// Retrieves all orders, newest order date first.
pub async fn get_all_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    let repo: Repository<'_, _, Order> = Repository::new(db);
    repo.many(repo.query().order_by_desc(order::Column::OrderDate))
        .await
}

/// Retrieves an order by its unique ID.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Repository::<'_, _, Order>::new(db).by_id(order_id).await
}

/// Retrieves the line items attached to an order.
pub async fn line_items_for_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> Result<Vec<order_details::Model>> {
    let repo: Repository<'_, _, OrderDetails> = Repository::new(conn);
    repo.many(
        repo.query()
            .filter(order_details::Column::OrderId.eq(order_id)),
    )
    .await
}

/// Sums the frozen line prices of an order.
pub async fn order_total(db: &DatabaseConnection, order_id: i64) -> Result<f64> {
    let lines = line_items_for_order(db, order_id).await?;
    Ok(lines.iter().map(|line| line.price).sum())
}

async fn is_delivered<C: ConnectionTrait>(conn: &C, order: &order::Model) -> Result<bool> {
    let current = Repository::<'_, _, crate::entities::Status>::new(conn)
        .by_id(order.status_id)
        .await?;
    Ok(current.is_some_and(|s| s.code == StatusCode::Delivered.as_str()))
}

/// Creates a new order for the given date in the initial "gathering" status.
///
/// Fails with `NotFound` if the initial status row has not been seeded.
pub async fn create_order(
    db: &DatabaseConnection,
    order_date: chrono::NaiveDate,
) -> Result<order::Model> {
    let uow = UnitOfWork::begin(db).await?;

    let gathering = status::find_by_code(uow.conn(), StatusCode::Gathering)
        .await?
        .ok_or(Error::NotFound {
            entity: "status",
            key: StatusCode::Gathering.as_str().to_string(),
        })?;

    let created = uow
        .repo::<Order>()
        .insert(order::ActiveModel {
            order_date: Set(order_date),
            status_id: Set(gathering.id),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(id = created.id, date = %created.order_date, "Created order");
    Ok(created)
}

/// Attaches a line item to an order.
///
/// The requested quantity must be positive and must not exceed the product's
/// current stock; stock is only checked here, never decremented (that happens
/// at delivery). The line price is frozen as `unit price * quantity` at this
/// instant.
pub async fn attach_line_item(
    db: &DatabaseConnection,
    order_id: i64,
    product_id: i64,
    quantity: i64,
) -> Result<order_details::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let uow = UnitOfWork::begin(db).await?;

    let order = uow
        .repo::<Order>()
        .by_id(order_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "order",
            key: order_id.to_string(),
        })?;
    if is_delivered(uow.conn(), &order).await? {
        return Err(Error::OrderDelivered { order_id });
    }

    let product = uow
        .repo::<Product>()
        .by_id(product_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "product",
            key: product_id.to_string(),
        })?;
    if product.quantity < quantity {
        return Err(Error::InsufficientStock {
            product: product.name,
            available: product.quantity,
            requested: quantity,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let line_price = product.price * quantity as f64;

    let created = uow
        .repo::<OrderDetails>()
        .insert(order_details::ActiveModel {
            quantity: Set(quantity),
            price: Set(line_price),
            product_id: Set(product_id),
            order_id: Set(order_id),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    debug!(
        order_id,
        product_id,
        quantity,
        price = line_price,
        "Attached line item"
    );
    Ok(created)
}

/// Detaches a line item from its order, removing the row.
///
/// No stock reversal occurs, since stock was never decremented at attach
/// time. Rejected once the owning order is delivered.
pub async fn detach_line_item(db: &DatabaseConnection, detail_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let details = uow.repo::<OrderDetails>();

    let line = details.by_id(detail_id).await?.ok_or(Error::NotFound {
        entity: "order detail",
        key: detail_id.to_string(),
    })?;

    let order = uow
        .repo::<Order>()
        .by_id(line.order_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "order",
            key: line.order_id.to_string(),
        })?;
    if is_delivered(uow.conn(), &order).await? {
        return Err(Error::OrderDelivered { order_id: order.id });
    }

    details.delete(line).await?;
    uow.commit().await?;

    debug!(detail_id, "Detached line item");
    Ok(())
}

/// Updates an order's status to any non-terminal state.
///
/// The terminal "delivered" status cannot be reached this way; that
/// transition runs through [`deliver_order`] so the stock effects happen.
/// An already delivered order rejects any further status change.
pub async fn set_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status_id: i64,
) -> Result<order::Model> {
    let uow = UnitOfWork::begin(db).await?;
    let orders = uow.repo::<Order>();

    let order = orders.by_id(order_id).await?.ok_or(Error::NotFound {
        entity: "order",
        key: order_id.to_string(),
    })?;
    if is_delivered(uow.conn(), &order).await? {
        return Err(Error::OrderDelivered { order_id });
    }

    let target = uow
        .repo::<crate::entities::Status>()
        .by_id(status_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "status",
            key: status_id.to_string(),
        })?;
    if target.code == StatusCode::Delivered.as_str() {
        return Err(Error::Validation {
            message: "The delivered status is set through order delivery, not a status update"
                .to_string(),
        });
    }

    let mut active: order::ActiveModel = order.into();
    active.status_id = Set(status_id);
    let updated = orders.update(active).await?;
    uow.commit().await?;

    info!(order_id, status_id, "Updated order status");
    Ok(updated)
}

/// Delivers an order: decrements every line item's product stock, appends a
/// ledger entry per line, and flips the status to "delivered", all in one
/// atomic unit of work.
///
/// If any line's decrement would drive its product's stock negative, the
/// whole operation aborts with `InsufficientStock` and no product changes.
/// Delivering an already delivered order is a no-op.
pub async fn deliver_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    use sea_orm::sea_query::Expr;

    let uow = UnitOfWork::begin(db).await?;
    let orders = uow.repo::<Order>();

    let order = orders.by_id(order_id).await?.ok_or(Error::NotFound {
        entity: "order",
        key: order_id.to_string(),
    })?;

    let delivered = status::find_by_code(uow.conn(), StatusCode::Delivered)
        .await?
        .ok_or(Error::NotFound {
            entity: "status",
            key: StatusCode::Delivered.as_str().to_string(),
        })?;

    if order.status_id == delivered.id {
        debug!(order_id, "Order already delivered, nothing to do");
        return Ok(order);
    }

    let lines = line_items_for_order(uow.conn(), order_id).await?;
    let sale_type = transaction_type::find_or_create(uow.conn(), DELIVERY_LEDGER_TYPE).await?;
    let now = chrono::Utc::now();

    for line in &lines {
        let item = uow
            .repo::<Product>()
            .by_id(line.product_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "product",
                key: line.product_id.to_string(),
            })?;

        // Guarded decrement: zero rows affected means the stock floor would
        // be crossed, and the dropped transaction rolls back every earlier
        // decrement in this order.
        let result = Product::update_many()
            .col_expr(
                product::Column::Quantity,
                Expr::col(product::Column::Quantity).sub(line.quantity),
            )
            .filter(product::Column::Id.eq(line.product_id))
            .filter(product::Column::Quantity.gte(line.quantity))
            .exec(uow.conn())
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::InsufficientStock {
                product: item.name,
                available: item.quantity,
                requested: line.quantity,
            });
        }

        uow.repo::<StorageTransaction>()
            .insert(storage_transaction::ActiveModel {
                description: Set(format!("Order #{order_id} delivered")),
                quantity_delta: Set(-line.quantity),
                product_id: Set(line.product_id),
                transaction_type_id: Set(sale_type.id),
                recorded_at: Set(now),
                ..Default::default()
            })
            .await?;
    }

    let mut active: order::ActiveModel = order.into();
    active.status_id = Set(delivered.id);
    let updated = orders.update(active).await?;
    uow.commit().await?;

    info!(order_id, lines = lines.len(), "Delivered order");
    Ok(updated)
}

/// Deletes an order; its line items cascade at the storage layer.
///
/// Deletion is not the inverse of delivery: stock decremented by a delivered
/// order is never restored, and an undelivered order never touched stock.
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let orders = uow.repo::<Order>();

    let order = orders.by_id(order_id).await?.ok_or(Error::NotFound {
        entity: "order",
        key: order_id.to_string(),
    })?;

    orders.delete(order).await?;
    uow.commit().await?;

    info!(order_id, "Deleted order");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::product::{get_product_by_id, update_product};
    use crate::test_utils::{
        create_custom_product, create_test_order, setup_test_db, setup_with_product, test_date,
    };

    #[tokio::test]
    async fn test_create_order_assigns_gathering_status() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_order(&db, test_date()).await?;
        let gathering = status::find_by_code(&db, StatusCode::Gathering)
            .await?
            .unwrap();
        assert_eq!(created.status_id, gathering.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_fails_without_initial_status() -> Result<()> {
        // Tables exist but no workflow rows were seeded.
        let db = crate::test_utils::fresh_db().await?;

        let result = create_order(&db, test_date()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "status",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_attach_freezes_line_price() -> Result<()> {
        let (db, shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;

        let line = attach_line_item(&db, order.id, runner.id, 3).await?;
        assert_eq!(line.price, runner.price * 3.0);

        // A later price edit never rewrites the frozen line price.
        update_product(
            &db,
            runner.id,
            runner.name.clone(),
            runner.price * 2.0,
            runner.image.clone(),
            runner.quantity,
            shoes.id,
        )
        .await?;

        let lines = line_items_for_order(&db, order.id).await?;
        assert_eq!(lines[0].price, runner.price * 3.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_attach_rejects_quantity_exceeding_stock() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;

        let result = attach_line_item(&db, order.id, runner.id, runner.quantity + 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock { .. }
        ));

        // No line item was created and stock is unchanged.
        assert!(line_items_for_order(&db, order.id).await?.is_empty());
        let unchanged = get_product_by_id(&db, runner.id).await?.unwrap();
        assert_eq!(unchanged.quantity, runner.quantity);

        Ok(())
    }

    #[tokio::test]
    async fn test_attach_rejects_non_positive_quantity() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;

        let zero = attach_line_item(&db, order.id, runner.id, 0).await;
        assert!(matches!(
            zero.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        let negative = attach_line_item(&db, order.id, runner.id, -2).await;
        assert!(matches!(negative.unwrap_err(), Error::InvalidQuantity { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_detach_never_changes_stock() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;

        let line = attach_line_item(&db, order.id, runner.id, 4).await?;
        detach_line_item(&db, line.id).await?;

        assert!(line_items_for_order(&db, order.id).await?.is_empty());
        let product = get_product_by_id(&db, runner.id).await?.unwrap();
        assert_eq!(product.quantity, runner.quantity);

        // The row is gone, not orphaned.
        let missing = detach_line_item(&db, line.id).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_deliver_decrements_stock_and_is_idempotent() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        assert_eq!(runner.quantity, 10);
        let order = create_test_order(&db).await?;

        let line = attach_line_item(&db, order.id, runner.id, 3).await?;
        assert_eq!(line.price, 150.0);

        let delivered_order = deliver_order(&db, order.id).await?;
        let delivered_status = status::find_by_code(&db, StatusCode::Delivered)
            .await?
            .unwrap();
        assert_eq!(delivered_order.status_id, delivered_status.id);

        let after = get_product_by_id(&db, runner.id).await?.unwrap();
        assert_eq!(after.quantity, 7);

        // Second delivery is a no-op: same stock state as one delivery.
        deliver_order(&db, order.id).await?;
        let again = get_product_by_id(&db, runner.id).await?.unwrap();
        assert_eq!(again.quantity, 7);

        Ok(())
    }

    #[tokio::test]
    async fn test_deliver_writes_ledger_entries() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;
        attach_line_item(&db, order.id, runner.id, 3).await?;

        deliver_order(&db, order.id).await?;

        let history = crate::core::ledger::history_for_product(&db, runner.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity_delta, -3);

        let sale = transaction_type::get_transaction_type_by_name(&db, "sale")
            .await?
            .unwrap();
        assert_eq!(history[0].transaction_type_id, sale.id);

        // Re-delivery appends nothing.
        deliver_order(&db, order.id).await?;
        let history = crate::core::ledger::history_for_product(&db, runner.id).await?;
        assert_eq!(history.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_deliver_is_atomic_across_line_items() -> Result<()> {
        let (db, shoes, runner) = setup_with_product().await?;
        let walker = create_custom_product(&db, "Walker", 40.0, 5, shoes.id).await?;
        let order = create_test_order(&db).await?;

        attach_line_item(&db, order.id, runner.id, 3).await?;
        attach_line_item(&db, order.id, walker.id, 5).await?;

        // Stock for the second line shrinks after attach, so delivery must
        // fail on it and roll back the first line's decrement too.
        update_product(
            &db,
            walker.id,
            walker.name.clone(),
            walker.price,
            walker.image.clone(),
            2,
            shoes.id,
        )
        .await?;

        let result = deliver_order(&db, order.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            }
        ));

        // Neither product changed and the order was not transitioned.
        assert_eq!(get_product_by_id(&db, runner.id).await?.unwrap().quantity, 10);
        assert_eq!(get_product_by_id(&db, walker.id).await?.unwrap().quantity, 2);
        let order = get_order_by_id(&db, order.id).await?.unwrap();
        assert!(!is_delivered(&db, &order).await?);

        // No ledger entries survived the rollback either.
        assert!(
            crate::core::ledger::history_for_product(&db, runner.id)
                .await?
                .is_empty()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_delivered_order_is_frozen() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;
        let line = attach_line_item(&db, order.id, runner.id, 2).await?;
        deliver_order(&db, order.id).await?;

        let attach = attach_line_item(&db, order.id, runner.id, 1).await;
        assert!(matches!(attach.unwrap_err(), Error::OrderDelivered { .. }));

        let detach = detach_line_item(&db, line.id).await;
        assert!(matches!(detach.unwrap_err(), Error::OrderDelivered { .. }));

        let gathering = status::find_by_code(&db, StatusCode::Gathering)
            .await?
            .unwrap();
        let set = set_order_status(&db, order.id, gathering.id).await;
        assert!(matches!(set.unwrap_err(), Error::OrderDelivered { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_order_status_rejects_delivered_target() -> Result<()> {
        let (db, _shoes, _runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;

        let delivered = status::find_by_code(&db, StatusCode::Delivered)
            .await?
            .unwrap();
        let result = set_order_status(&db, order.id, delivered.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_order_status_non_terminal() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;

        let packed =
            crate::core::status::create_status(&db, "packed".to_string(), "Packed".to_string())
                .await?;
        let updated = set_order_status(&db, order.id, packed.id).await?;
        assert_eq!(updated.status_id, packed.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_cascades_lines_without_stock_reversal() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;
        let line = attach_line_item(&db, order.id, runner.id, 4).await?;

        delete_order(&db, order.id).await?;

        assert!(get_order_by_id(&db, order.id).await?.is_none());
        let details: Repository<'_, _, OrderDetails> = Repository::new(&db);
        assert!(details.by_id(line.id).await?.is_none());

        // Never-delivered order: stock untouched.
        assert_eq!(get_product_by_id(&db, runner.id).await?.unwrap().quantity, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_delivered_order_keeps_stock_decremented() -> Result<()> {
        let (db, _shoes, runner) = setup_with_product().await?;
        let order = create_test_order(&db).await?;
        attach_line_item(&db, order.id, runner.id, 4).await?;
        deliver_order(&db, order.id).await?;

        delete_order(&db, order.id).await?;

        // Deletion is not the inverse of delivery.
        assert_eq!(get_product_by_id(&db, runner.id).await?.unwrap().quantity, 6);

        Ok(())
    }

    #[tokio::test]
    async fn test_order_total_sums_frozen_prices() -> Result<()> {
        let (db, shoes, runner) = setup_with_product().await?;
        let walker = create_custom_product(&db, "Walker", 40.0, 5, shoes.id).await?;
        let order = create_test_order(&db).await?;

        attach_line_item(&db, order.id, runner.id, 2).await?;
        attach_line_item(&db, order.id, walker.id, 1).await?;

        assert_eq!(order_total(&db, order.id).await?, 140.0);

        Ok(())
    }
}
