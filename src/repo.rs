//! Generic repository and unit-of-work over the persistence boundary.
//!
//! Every higher-level operation reaches storage through these two types. The
//! repository is parameterized by entity type and by connection, so the same
//! code runs against a plain connection for reads or inside a unit of work
//! for composed mutations. A [`UnitOfWork`] wraps one database transaction:
//! changes staged through its repositories become visible only on
//! [`UnitOfWork::commit`], and dropping it without committing rolls
//! everything back.

use crate::errors::Result;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, ModelTrait, PrimaryKeyTrait, Select,
    TransactionTrait,
};
use std::marker::PhantomData;

/// Uniform CRUD access to one entity type over any connection.
pub struct Repository<'c, C, E> {
    conn: &'c C,
    entity: PhantomData<E>,
}

impl<'c, C, E> Repository<'c, C, E>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    /// Creates a repository bound to a connection or transaction.
    pub const fn new(conn: &'c C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    /// The underlying connection, for executing escape-hatch queries.
    pub const fn conn(&self) -> &'c C {
        self.conn
    }

    /// Fetches every row of the entity.
    pub async fn all(&self) -> Result<Vec<E::Model>> {
        E::find().all(self.conn).await.map_err(Into::into)
    }

    /// Fetches one row by primary key, `None` if absent.
    pub async fn by_id<K>(&self, id: K) -> Result<Option<E::Model>>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(self.conn).await.map_err(Into::into)
    }

    /// Query-builder escape hatch for filtered, sorted, or projected reads
    /// without materializing the full set. Execute with [`Self::one`] or
    /// [`Self::many`].
    pub fn query(&self) -> Select<E> {
        E::find()
    }

    /// Executes a built query expecting at most one row.
    pub async fn one(&self, select: Select<E>) -> Result<Option<E::Model>> {
        select.one(self.conn).await.map_err(Into::into)
    }

    /// Executes a built query returning all matching rows.
    pub async fn many(&self, select: Select<E>) -> Result<Vec<E::Model>> {
        select.all(self.conn).await.map_err(Into::into)
    }

    /// Inserts a new row and returns the stored model.
    pub async fn insert(&self, entity: E::ActiveModel) -> Result<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        entity.insert(self.conn).await.map_err(Into::into)
    }

    /// Updates an existing row and returns the stored model.
    pub async fn update(&self, entity: E::ActiveModel) -> Result<E::Model>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        entity.update(self.conn).await.map_err(Into::into)
    }

    /// Deletes a row.
    pub async fn delete(&self, entity: E::Model) -> Result<()>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelBehavior + Send,
    {
        entity.delete(self.conn).await?;
        Ok(())
    }
}

/// One logical transaction: the scope of staged changes flushed atomically by
/// a single commit.
///
/// A unit of work is created per operation and passed explicitly, never held
/// for the lifetime of the application. On failure paths the value is simply
/// dropped and the underlying transaction rolls back, so no partial changes
/// are ever visible.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Opens a transaction against the database.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self> {
        Ok(Self {
            txn: db.begin().await?,
        })
    }

    /// A repository for `E` whose changes are staged in this unit of work.
    pub const fn repo<E: EntityTrait>(&self) -> Repository<'_, DatabaseTransaction, E> {
        Repository::new(&self.txn)
    }

    /// The underlying transaction, for raw statements that bypass the
    /// repository surface (e.g. guarded column updates).
    pub const fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Persists all staged changes atomically.
    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await.map_err(Into::into)
    }

    /// Discards all staged changes explicitly.
    pub async fn rollback(self) -> Result<()> {
        self.txn.rollback().await.map_err(Into::into)
    }
}
