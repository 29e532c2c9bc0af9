//! # CSV Connection
//!
//! Manages the base directory for CSV file storage and carries the change bus
//! that live ledger subscriptions listen on.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── transactions.csv    # The transaction ledger
//! ├── shares.csv          # Access grants between users
//! ├── categories.csv      # User-defined categories
//! └── settings.yaml       # Device-local settings (managed elsewhere)
//! ```

use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::storage::traits::Connection;

/// Capacity of the change bus; subscribers that fall further behind observe a
/// lag and simply re-query
const CHANGE_BUS_CAPACITY: usize = 64;

/// CSV connection managing file paths and change notifications
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<Mutex<PathBuf>>,
    change_tx: broadcast::Sender<()>,
}

impl CsvConnection {
    /// Create a new CSV connection with the specified base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("📁 Created data directory: {:?}", base_path);
        }

        let (change_tx, _) = broadcast::channel(CHANGE_BUS_CAPACITY);

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
            change_tx,
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        let base_dir = self.base_directory.lock().unwrap();
        base_dir.clone()
    }

    /// Get the file path for the transaction ledger
    pub fn get_transactions_file_path(&self) -> PathBuf {
        self.base_directory().join("transactions.csv")
    }

    /// Get the file path for access grants
    pub fn get_shares_file_path(&self) -> PathBuf {
        self.base_directory().join("shares.csv")
    }

    /// Get the file path for user-defined categories
    pub fn get_categories_file_path(&self) -> PathBuf {
        self.base_directory().join("categories.csv")
    }

    /// Ensure a CSV file exists with the given header line
    pub fn ensure_file_exists(&self, file_path: &Path, header: &str) -> Result<()> {
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if !file_path.exists() {
            fs::write(file_path, format!("{}\n", header))?;
            info!("📄 Created CSV file: {:?}", file_path);
        }

        Ok(())
    }

    /// Subscribe to transaction change notifications
    pub fn transaction_events(&self) -> broadcast::Receiver<()> {
        self.change_tx.subscribe()
    }

    /// Notify live subscriptions that the transaction set changed
    pub fn notify_transactions_changed(&self) {
        // Send only fails when nobody is subscribed
        let _ = self.change_tx.send(());
    }
}


// Implement the Connection trait for CsvConnection
impl Connection for CsvConnection {
    type TransactionRepository = super::transaction_repository::TransactionRepository;
    type ShareRepository = super::share_repository::ShareRepository;
    type CategoryRepository = super::category_repository::CategoryRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        super::transaction_repository::TransactionRepository::new(self.clone())
    }

    fn create_share_repository(&self) -> Self::ShareRepository {
        super::share_repository::ShareRepository::new(self.clone())
    }

    fn create_category_repository(&self) -> Self::CategoryRepository {
        super::category_repository::CategoryRepository::new(self.clone())
    }
}
