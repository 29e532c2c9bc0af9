//! # Storage Traits
//!
//! Defines the storage abstraction traits that allow different storage
//! backends to be used interchangeably by the domain layer. Repositories are
//! created through a `Connection`, so services never name a concrete backend.

use anyhow::Result;
use async_trait::async_trait;
use shared::{CustomCategory, ShareGrant, SharePermission, Transaction, UpdateTransactionRequest};
use tokio::sync::broadcast;

/// Trait defining the interface for transaction storage operations
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Store a new transaction record
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Retrieve a specific transaction by ID
    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// List the records created under the given user ID
    async fn list_by_user_id(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// List the records addressed to the given email
    async fn list_by_user_email(&self, user_email: &str) -> Result<Vec<Transaction>>;

    /// Update the editable fields of an existing record
    /// Returns true if the record was found and updated
    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: &UpdateTransactionRequest,
    ) -> Result<bool>;

    /// Delete a single record
    /// Returns true if the record was found and deleted, false otherwise
    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool>;

    /// Subscribe to change notifications; the receiver fires after every
    /// mutation of the transaction set
    fn change_events(&self) -> broadcast::Receiver<()>;
}

/// Trait defining the interface for share grant storage operations
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Store a new grant
    async fn store_grant(&self, grant: &ShareGrant) -> Result<()>;

    /// List the grants a ledger owner has created
    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<ShareGrant>>;

    /// List the grants addressed to the given email
    async fn list_by_grantee(&self, email: &str) -> Result<Vec<ShareGrant>>;

    /// Change the permission of an existing grant
    /// Returns true if the grant was found and updated
    async fn update_permission(&self, grant_id: &str, permission: SharePermission) -> Result<bool>;

    /// Delete a grant
    /// Returns true if the grant was found and deleted, false otherwise
    async fn delete_grant(&self, grant_id: &str) -> Result<bool>;
}

/// Trait defining the interface for custom category storage operations
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Store a new custom category
    async fn store_category(&self, category: &CustomCategory) -> Result<()>;

    /// List the categories the given user has defined
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<CustomCategory>>;
}

/// Trait defining the interface for the device-local settings store
///
/// Payloads are opaque serialized text. Every write replaces the whole value
/// under its key; there are no partial updates.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the payload stored under a key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the payload stored under a key
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// A connection manages the backing resource (CSV files here) and acts as a
/// factory for the repositories the domain services use.
pub trait Connection: Send + Sync + Clone {
    /// The type of TransactionStore this connection creates
    type TransactionRepository: TransactionStore;

    /// The type of ShareStore this connection creates
    type ShareRepository: ShareStore;

    /// The type of CategoryStore this connection creates
    type CategoryRepository: CategoryStore;

    /// Create a new transaction repository for this connection
    fn create_transaction_repository(&self) -> Self::TransactionRepository;

    /// Create a new share repository for this connection
    fn create_share_repository(&self) -> Self::ShareRepository;

    /// Create a new category repository for this connection
    fn create_category_repository(&self) -> Self::CategoryRepository;
}
