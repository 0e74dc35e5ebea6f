//! Category catalog rules.
//!
//! Categories carry the uniqueness constraint on their name; renames and
//! deletes apply directly once invoked (confirming with the user about
//! dependent products is a caller concern). Deleting a category cascades to
//! its products at the storage layer.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, QueryOrder, Set};
use tracing::info;

/// Retrieves all categories ordered alphabetically by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    let repo: Repository<'_, _, Category> = Repository::new(db);
    repo.many(repo.query().order_by_asc(category::Column::Name))
        .await
}

/// Retrieves a category by its unique ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Repository::<'_, _, Category>::new(db).by_id(category_id).await
}

/// Finds a category by its unique name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    let repo: Repository<'_, _, Category> = Repository::new(db);
    repo.one(repo.query().filter(category::Column::Name.eq(name)))
        .await
}

/// Creates a new category with a unique, non-empty name.
pub async fn create_category(db: &DatabaseConnection, name: String) -> Result<category::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Category>();

    let existing = repo
        .one(repo.query().filter(category::Column::Name.eq(name.as_str())))
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateName {
            entity: "category",
            name,
        });
    }

    let created = repo
        .insert(category::ActiveModel {
            name: Set(name),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(id = created.id, name = %created.name, "Created category");
    Ok(created)
}

/// Renames a category, validating uniqueness against every other category.
///
/// Products keep their foreign key to the category, so the rename is visible
/// everywhere without touching them.
pub async fn rename_category(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: String,
) -> Result<category::Model> {
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Category>();

    let existing = repo.by_id(category_id).await?.ok_or(Error::NotFound {
        entity: "category",
        key: category_id.to_string(),
    })?;

    let clash = repo
        .one(
            repo.query()
                .filter(category::Column::Name.eq(new_name.as_str()))
                .filter(category::Column::Id.ne(category_id)),
        )
        .await?;
    if clash.is_some() {
        return Err(Error::DuplicateName {
            entity: "category",
            name: new_name,
        });
    }

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(new_name);
    let updated = repo.update(active).await?;
    uow.commit().await?;

    info!(id = updated.id, name = %updated.name, "Renamed category");
    Ok(updated)
}

/// Deletes a category; dependent products cascade at the storage layer.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<Category>();

    let existing = repo.by_id(category_id).await?.ok_or(Error::NotFound {
        entity: "category",
        key: category_id.to_string(),
    })?;

    repo.delete(existing).await?;
    uow.commit().await?;

    info!(id = category_id, "Deleted category");
    Ok(())
}
