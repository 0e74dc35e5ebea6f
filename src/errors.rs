//! Unified error type for the engine.
//!
//! Every rejected operation carries the specific precondition that failed,
//! so callers can surface a concrete reason instead of a generic failure.

use thiserror::Error;

/// All failure modes surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// A field failed validation before any change was staged
    #[error("Validation error: {message}")]
    Validation {
        /// Which precondition failed
        message: String,
    },

    /// A referenced row does not exist
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Entity kind, e.g. "product"
        entity: &'static str,
        /// The id or name that was looked up
        key: String,
    },

    /// A name that must be unique within its set is already taken
    #[error("{entity} with name '{name}' already exists")]
    DuplicateName {
        /// Entity kind, e.g. "category"
        entity: &'static str,
        /// The conflicting name
        name: String,
    },

    /// A (name, category) pair is already taken by another product
    #[error("product '{name}' in category '{category}' already exists")]
    DuplicateProduct {
        /// The conflicting product name
        name: String,
        /// The category the name collides in
        category: String,
    },

    /// A stock mutation would drive a product's quantity negative
    #[error(
        "insufficient quantity for product '{product}': {available} in stock, {requested} requested"
    )]
    InsufficientStock {
        /// Product whose stock would go negative
        product: String,
        /// Quantity currently in stock
        available: i64,
        /// Quantity the operation needed
        requested: i64,
    },

    /// The order is already delivered and frozen against further mutation
    #[error("order {order_id} is already delivered")]
    OrderDelivered {
        /// The delivered order's id
        order_id: i64,
    },

    /// A price was negative or not finite
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected value
        price: f64,
    },

    /// A quantity was out of range for the operation
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected value
        quantity: i64,
    },

    /// Login/password pair did not match a user
    #[error("invalid login or password")]
    InvalidCredentials,

    /// An interchange document could not be serialized or deserialized
    #[error("Interchange error: {0}")]
    Interchange(#[from] serde_json::Error),

    /// I/O failure reading or writing an interchange file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage engine rejected or failed a commit
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
