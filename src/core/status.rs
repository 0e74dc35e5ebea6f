//! Status rules - the workflow states orders move through.
//!
//! Status rows are user-editable, but the two states the fulfillment
//! workflow cares about are addressed by stable code, never by display name,
//! so renaming a row cannot break the delivery gate.

use crate::{
    entities::{Status, status},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, Set};
use tracing::info;

/// The stable workflow tags the fulfillment state machine recognizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusCode {
    /// Initial state assigned at order creation
    Gathering,
    /// Terminal state that triggers the stock decrement
    Delivered,
}

impl StatusCode {
    /// The tag stored in the status row's `code` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gathering => "gathering",
            Self::Delivered => "delivered",
        }
    }
}

/// Finds the status row carrying a workflow code, `None` if not seeded.
pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    code: StatusCode,
) -> Result<Option<status::Model>> {
    let repo: Repository<'_, _, Status> = Repository::new(conn);
    repo.one(repo.query().filter(status::Column::Code.eq(code.as_str())))
        .await
}

/// Retrieves all statuses ordered alphabetically by display name.
pub async fn get_all_statuses(db: &DatabaseConnection) -> Result<Vec<status::Model>> {
    let repo: Repository<'_, _, Status> = Repository::new(db);
    repo.many(repo.query().order_by_asc(status::Column::Name))
        .await
}

/// Retrieves a status by its unique ID.
pub async fn get_status_by_id(
    db: &DatabaseConnection,
    status_id: i64,
) -> Result<Option<status::Model>> {
    Repository::<'_, _, Status>::new(db).by_id(status_id).await
}

/// Creates a new status with a unique code and display name.
pub async fn create_status(
    db: &DatabaseConnection,
    code: String,
    name: String,
) -> Result<status::Model> {
    let name = name.trim().to_string();
    let code = code.trim().to_string();
    if name.is_empty() || code.is_empty() {
        return Err(Error::Validation {
            message: "Status code and name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Status>();

    let clash = repo
        .one(repo.query().filter(
            status::Column::Code
                .eq(code.as_str())
                .or(status::Column::Name.eq(name.as_str())),
        ))
        .await?;
    if clash.is_some() {
        return Err(Error::DuplicateName {
            entity: "status",
            name,
        });
    }

    let created = repo
        .insert(status::ActiveModel {
            code: Set(code),
            name: Set(name),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(id = created.id, code = %created.code, "Created status");
    Ok(created)
}

/// Renames a status's display name; the stable code never changes.
///
/// Orders referencing the status are unaffected because the workflow matches
/// on code.
pub async fn rename_status(
    db: &DatabaseConnection,
    status_id: i64,
    new_name: String,
) -> Result<status::Model> {
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(Error::Validation {
            message: "Status name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Status>();

    let existing = repo.by_id(status_id).await?.ok_or(Error::NotFound {
        entity: "status",
        key: status_id.to_string(),
    })?;

    let clash = repo
        .one(
            repo.query()
                .filter(status::Column::Name.eq(new_name.as_str()))
                .filter(status::Column::Id.ne(status_id)),
        )
        .await?;
    if clash.is_some() {
        return Err(Error::DuplicateName {
            entity: "status",
            name: new_name,
        });
    }

    let mut active: status::ActiveModel = existing.into();
    active.name = Set(new_name);
    let updated = repo.update(active).await?;
    uow.commit().await?;

    Ok(updated)
}

/// Deletes a status row.
///
/// Warning the user about dependent orders is a caller concern; the core
/// applies the delete once invoked.
pub async fn delete_status(db: &DatabaseConnection, status_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Status>();

    let existing = repo.by_id(status_id).await?.ok_or(Error::NotFound {
        entity: "status",
        key: status_id.to_string(),
    })?;

    repo.delete(existing).await?;
    uow.commit().await?;

    info!(id = status_id, "Deleted status");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_workflow_codes_are_seeded() -> Result<()> {
        let db = setup_test_db().await?;

        let gathering = find_by_code(&db, StatusCode::Gathering).await?.unwrap();
        assert_eq!(gathering.name, "Gathering at warehouse");

        let delivered = find_by_code(&db, StatusCode::Delivered).await?.unwrap();
        assert_eq!(delivered.name, "Delivered");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_status_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;

        create_status(&db, "packed".to_string(), "Packed".to_string()).await?;

        let result = create_status(&db, "packed2".to_string(), "Packed".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateName { entity: "status", .. }
        ));

        let result = create_status(&db, "packed".to_string(), "Packed again".to_string()).await;
        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_rename_keeps_code_stable() -> Result<()> {
        let db = setup_test_db().await?;

        let delivered = find_by_code(&db, StatusCode::Delivered).await?.unwrap();
        let renamed = rename_status(&db, delivered.id, "Handed over".to_string()).await?;

        assert_eq!(renamed.name, "Handed over");
        assert_eq!(renamed.code, StatusCode::Delivered.as_str());

        // The workflow still resolves the terminal state after the rename.
        let found = find_by_code(&db, StatusCode::Delivered).await?.unwrap();
        assert_eq!(found.id, delivered.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_rename_rejects_taken_name() -> Result<()> {
        let db = setup_test_db().await?;

        let gathering = find_by_code(&db, StatusCode::Gathering).await?.unwrap();
        let result = rename_status(&db, gathering.id, "Delivered".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateName { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_status_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_status(&db, 999).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
