//! Transaction type rules - the classifications applied to ledger entries.

use crate::{
    entities::{TransactionType, transaction_type},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, Set};
use tracing::info;

/// Retrieves all transaction types ordered alphabetically by name.
pub async fn get_all_transaction_types(
    db: &DatabaseConnection,
) -> Result<Vec<transaction_type::Model>> {
    let repo: Repository<'_, _, TransactionType> = Repository::new(db);
    repo.many(repo.query().order_by_asc(transaction_type::Column::Name))
        .await
}

/// Finds a transaction type by its unique name.
pub async fn get_transaction_type_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<transaction_type::Model>> {
    let repo: Repository<'_, _, TransactionType> = Repository::new(conn);
    repo.one(repo.query().filter(transaction_type::Column::Name.eq(name)))
        .await
}

/// Finds a transaction type by name, creating it when missing.
///
/// Ledger writers use this so a missing classification never blocks an
/// otherwise valid stock movement.
pub async fn find_or_create<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<transaction_type::Model> {
    if let Some(existing) = get_transaction_type_by_name(conn, name).await? {
        return Ok(existing);
    }

    let repo: Repository<'_, _, TransactionType> = Repository::new(conn);
    repo.insert(transaction_type::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    })
    .await
}

/// Creates a new transaction type with a unique, non-empty name.
pub async fn create_transaction_type(
    db: &DatabaseConnection,
    name: String,
) -> Result<transaction_type::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Transaction type name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;

    if get_transaction_type_by_name(uow.conn(), &name).await?.is_some() {
        return Err(Error::DuplicateName {
            entity: "transaction type",
            name,
        });
    }

    let created = uow
        .repo::<TransactionType>()
        .insert(transaction_type::ActiveModel {
            name: Set(name),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(id = created.id, name = %created.name, "Created transaction type");
    Ok(created)
}

/// Renames a transaction type, validating uniqueness excluding itself.
pub async fn rename_transaction_type(
    db: &DatabaseConnection,
    type_id: i64,
    new_name: String,
) -> Result<transaction_type::Model> {
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(Error::Validation {
            message: "Transaction type name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<TransactionType>();

    let existing = repo.by_id(type_id).await?.ok_or(Error::NotFound {
        entity: "transaction type",
        key: type_id.to_string(),
    })?;

    let clash = repo
        .one(
            repo.query()
                .filter(transaction_type::Column::Name.eq(new_name.as_str()))
                .filter(transaction_type::Column::Id.ne(type_id)),
        )
        .await?;
    if clash.is_some() {
        return Err(Error::DuplicateName {
            entity: "transaction type",
            name: new_name,
        });
    }

    let mut active: transaction_type::ActiveModel = existing.into();
    active.name = Set(new_name);
    let updated = repo.update(active).await?;
    uow.commit().await?;

    Ok(updated)
}

/// Deletes a transaction type row.
pub async fn delete_transaction_type(db: &DatabaseConnection, type_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<TransactionType>();

    let existing = repo.by_id(type_id).await?.ok_or(Error::NotFound {
        entity: "transaction type",
        key: type_id.to_string(),
    })?;

    repo.delete(existing).await?;
    uow.commit().await?;

    info!(id = type_id, "Deleted transaction type");
    Ok(())
}
