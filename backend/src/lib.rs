//! # Backend Module
//!
//! Contains all non-UI logic for the cashflow tracker application.
//!
//! This crate brings together:
//! - **Domain**: Transaction recording, installment splitting, budgets,
//!   aggregation series and sharing rules
//! - **Storage**: CSV-backed record persistence plus a YAML settings store
//!
//! The backend is UI-agnostic; any shell that can call async Rust and render
//! the returned data can sit on top of it.
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (shell)
//!     ↓
//! Domain Layer (services, live feed)
//!     ↓
//! Storage Layer (CSV record store, YAML settings)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and wire the application state over one data directory
//! - Keep the displayed ledger live through store change notifications
//! - Enforce the business rules before anything reaches disk

pub mod domain;
pub mod storage;

use anyhow::Result;
use log::info;
use shared::ProfileRef;
use std::path::Path;

pub use domain::*;
pub use storage::*;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: TransactionService<CsvConnection>,
    pub budget_service: BudgetService<YamlLocalStore>,
    pub profile_service: ProfileService<CsvConnection>,
    pub category_service: CategoryService<CsvConnection>,
    pub session_service: SessionService<YamlLocalStore>,
    pub connection: CsvConnection,
}

/// Initialize the backend with all required services over a data directory
pub fn initialize_backend<P: AsRef<Path>>(data_directory: P) -> Result<AppState> {
    info!("Setting up storage");
    let connection = CsvConnection::new(&data_directory)?;
    let local_store = YamlLocalStore::new(&data_directory)?;

    info!("Setting up domain services");
    let app_state = AppState {
        transaction_service: TransactionService::new(connection.clone()),
        budget_service: BudgetService::new(local_store.clone()),
        profile_service: ProfileService::new(connection.clone()),
        category_service: CategoryService::new(connection.clone()),
        session_service: SessionService::new(local_store),
        connection,
    };

    Ok(app_state)
}

impl AppState {
    /// Start the live merged feed for the given profile
    pub fn start_feed(&self, profile: &ProfileRef) -> LedgerFeed {
        LedgerFeed::spawn(self.connection.clone(), profile)
    }
}
