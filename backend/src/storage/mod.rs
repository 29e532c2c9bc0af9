//! # Storage Module
//!
//! Handles all data persistence for the cashflow tracker.
//!
//! The domain layer only sees the traits defined here; the CSV and YAML
//! implementations can be swapped for another backend without touching the
//! services.
//!
//! ## Key Responsibilities
//!
//! - **Record Persistence**: Saving transactions, grants and categories to disk
//! - **Local Settings**: Device-local key-value storage for budgets and session state
//! - **Change Notifications**: Telling live subscriptions when the ledger changed
//! - **Storage Abstraction**: A consistent API regardless of storage backend
//!
//! ## Current Implementation
//!
//! - **Record Store**: CSV files, one per record type, rewritten atomically
//! - **Local Store**: A single YAML settings file

pub mod csv;
pub mod local;
pub mod traits;

// Re-export the main types that other modules need
pub use self::csv::CsvConnection;
pub use local::YamlLocalStore;
pub use traits::{CategoryStore, Connection, LocalStore, ShareStore, TransactionStore};
