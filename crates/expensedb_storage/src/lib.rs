//! # ExpenseDB Storage
//!
//! Persistence adapter trait and implementations for ExpenseDB.
//!
//! This crate provides the lowest-level persistence abstraction for
//! ExpenseDB. Adapters are **opaque string stores** keyed by short string
//! keys - they do not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Adapters are simple key-value stores (save, load, delete, clear)
//! - No knowledge of record formats or collection layout
//! - Must be `Send + Sync` for concurrent access
//! - ExpenseDB owns all blob interpretation
//!
//! ## Available Adapters
//!
//! - [`MemoryStorage`] - For testing and ephemeral storage
//! - [`FileStorage`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use expensedb_storage::{StorageAdapter, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! storage.save("mykey", "payload").unwrap();
//! assert_eq!(storage.load("mykey").unwrap().as_deref(), Some("payload"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod error;
mod file;
mod memory;

pub use adapter::StorageAdapter;
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
