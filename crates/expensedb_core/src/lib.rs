//! # ExpenseDB Core
//!
//! Record model, mutation/query engine and merge algorithm for ExpenseDB.
//!
//! This crate provides:
//! - The [`Expense`] record with its closed [`Category`] and [`Currency`]
//!   sets and validating construction
//! - [`ExpenseStore`] - the in-memory collection with synchronous
//!   whole-collection persistence through a storage adapter
//! - Filtered queries and single-pass aggregation
//! - [`merge_last_write_wins`] - deterministic reconciliation of local and
//!   remote snapshots
//!
//! ## Design Principles
//!
//! - Local-first: every mutation is durable locally before it returns,
//!   independent of remote confirmation
//! - Whole-blob persistence: the collection is one JSON array under one
//!   storage key; every mutation rewrites it
//! - Availability over strictness on startup: an unreadable or corrupt blob
//!   yields an empty collection (logged), a failed save is an error
//! - Validation at the boundary: amounts must be positive, categories and
//!   currencies come from closed sets, ids are unique
//!
//! ## Example
//!
//! ```rust
//! use expensedb_core::{Category, Expense, ExpenseFilter, ExpenseStore};
//! use expensedb_storage::MemoryStorage;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let mut store = ExpenseStore::new(Arc::new(MemoryStorage::new()));
//! let lunch = Expense::new(Decimal::new(2550, 2), Category::FoodAndDining)
//!     .unwrap()
//!     .with_description("Lunch");
//! store.add(lunch).unwrap();
//!
//! assert_eq!(store.total(&ExpenseFilter::new()), Decimal::new(2550, 2));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod category;
mod currency;
mod error;
mod expense;
mod filter;
mod merge;
mod store;

pub use category::Category;
pub use currency::Currency;
pub use error::{CoreError, CoreResult};
pub use expense::{Expense, ExpenseId, ExpensePatch, SyncStatus};
pub use filter::{ExpenseAnalysis, ExpenseFilter};
pub use merge::merge_last_write_wins;
pub use store::{ExpenseStore, STORAGE_KEY};
