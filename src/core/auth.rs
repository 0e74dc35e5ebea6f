//! Authentication boundary.
//!
//! Credentials are compared as stored; hashing them is a concern of whatever
//! provisions the user rows, not of this lookup. Callers branch only on the
//! returned `is_admin` flag.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
    repo::{Repository, UnitOfWork},
};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use tracing::{info, warn};

/// Checks a login/password pair against the users table.
///
/// A miss on either the login or the password yields the same
/// `InvalidCredentials` error, never revealing which half failed.
pub async fn authenticate(
    db: &DatabaseConnection,
    login: &str,
    password: &str,
) -> Result<user::Model> {
    let repo: Repository<'_, _, User> = Repository::new(db);
    let found = repo
        .one(repo.query().filter(user::Column::Login.eq(login)))
        .await?;

    match found {
        Some(user) if user.password == password => {
            info!(login, is_admin = user.is_admin, "Authenticated user");
            Ok(user)
        }
        _ => {
            warn!(login, "Rejected credentials");
            Err(Error::InvalidCredentials)
        }
    }
}

/// Creates a user with a unique, non-empty login.
pub async fn create_user(
    db: &DatabaseConnection,
    login: String,
    password: String,
    is_admin: bool,
) -> Result<user::Model> {
    let login = login.trim().to_string();
    if login.is_empty() {
        return Err(Error::Validation {
            message: "User login cannot be empty".to_string(),
        });
    }

    let uow = UnitOfWork::begin(db).await?;
    let repo = uow.repo::<User>();

    let existing = repo
        .one(repo.query().filter(user::Column::Login.eq(login.as_str())))
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateName {
            entity: "user",
            name: login,
        });
    }

    let created = repo
        .insert(user::ActiveModel {
            login: Set(login),
            password: Set(password),
            is_admin: Set(is_admin),
            ..Default::default()
        })
        .await?;
    uow.commit().await?;

    info!(id = created.id, login = %created.login, "Created user");
    Ok(created)
}
