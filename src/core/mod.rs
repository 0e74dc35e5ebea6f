//! Core business logic, framework-agnostic.
//!
//! Each module owns the domain rules for one area; all persistence goes
//! through the generic repository and unit-of-work in [`crate::repo`], and
//! every invariant (uniqueness, stock floor, delivery gate) lives here rather
//! than in the repository plumbing.

/// Login/password lookup (consumed only as an admin yes/no gate)
pub mod auth;
/// Category catalog rules
pub mod category;
/// JSON interchange documents: bulk import/export
pub mod interchange;
/// Append-only stock ledger writes and history
pub mod ledger;
/// Order fulfillment state machine
pub mod order;
/// Product catalog rules
pub mod product;
/// Order workflow statuses and the stable status codes
pub mod status;
/// Ledger transaction type rules
pub mod transaction_type;
