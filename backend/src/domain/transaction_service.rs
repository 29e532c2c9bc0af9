//! Transaction service.
//!
//! Validates submitted forms, expands installment purchases into their parts
//! and writes the resulting records under the active profile. Reads go
//! through the same two-query union the live feed uses, so a one-shot list
//! and the feed always agree.

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::info;
use shared::{
    NewTransactionRequest, PaymentMethod, ProfileRef, Transaction, TransactionFormConfig,
    UpdateTransactionRequest,
};

use crate::domain::errors::ValidationError;
use crate::domain::feed::merge_snapshots;
use crate::domain::installments::create_installments;
use crate::storage::{Connection, TransactionStore};

/// Transaction service handling creation, edits and deletion of records
#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    connection: C,
    config: TransactionFormConfig,
}

impl<C: Connection> TransactionService<C> {
    /// Create a new transaction service with default form rules
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            config: TransactionFormConfig::default(),
        }
    }

    /// Create a transaction service with custom form rules
    pub fn with_config(connection: C, config: TransactionFormConfig) -> Self {
        Self { connection, config }
    }

    fn validate_request(&self, request: &NewTransactionRequest) -> Result<(), ValidationError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if description.chars().count() > self.config.max_description_length {
            return Err(ValidationError::DescriptionTooLong(
                self.config.max_description_length,
            ));
        }
        if request.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if request.amount <= 0.0 {
            return Err(ValidationError::AmountNotPositive);
        }

        if request.is_installment {
            if request.payment_method != Some(PaymentMethod::Credit) {
                return Err(ValidationError::InstallmentsRequireCredit);
            }
            let count = request.installment_count.unwrap_or(0);
            if count < self.config.min_installments || count > self.config.max_installments {
                return Err(ValidationError::InstallmentCountOutOfRange {
                    min: self.config.min_installments,
                    max: self.config.max_installments,
                });
            }
        }

        Ok(())
    }

    fn validate_patch(&self, patch: &UpdateTransactionRequest) -> Result<(), ValidationError> {
        if patch.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if patch.description.trim().chars().count() > self.config.max_description_length {
            return Err(ValidationError::DescriptionTooLong(
                self.config.max_description_length,
            ));
        }
        if patch.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if patch.amount <= 0.0 {
            return Err(ValidationError::AmountNotPositive);
        }
        Ok(())
    }

    /// Create the stored records for a submitted transaction on the given
    /// profile.
    ///
    /// An installment purchase becomes one record per part; anything else
    /// becomes a single record. Returns the records as stored.
    pub async fn create_transaction(
        &self,
        request: &NewTransactionRequest,
        profile: &ProfileRef,
    ) -> Result<Vec<Transaction>> {
        self.validate_request(request)?;

        if !profile.can_edit() {
            return Err(ValidationError::ReadOnlyProfile.into());
        }

        // Records on someone else's ledger carry the owner's email instead of
        // the creator's user ID, which is what that owner's feed queries for
        let (user_id, user_email) = match profile {
            ProfileRef::Own { user_id, .. } => (Some(user_id.clone()), None),
            ProfileRef::Shared { owner_email, .. } => (None, Some(owner_email.clone())),
        };

        let transaction = Transaction {
            id: Transaction::generate_id(request.kind, Utc::now().timestamp_millis() as u64),
            kind: request.kind,
            amount: request.amount,
            description: request.description.trim().to_string(),
            category: request.category.trim().to_string(),
            date: request.date.unwrap_or_else(Utc::now),
            payment_method: request.payment_method,
            is_installment: request.is_installment,
            installment_count: if request.is_installment {
                request.installment_count
            } else {
                None
            },
            current_installment: None,
            original_transaction_id: None,
            user_id,
            user_email,
        };

        let records = create_installments(&transaction);

        let repository = self.connection.create_transaction_repository();
        for record in &records {
            repository.store_transaction(record).await?;
        }

        info!(
            "✅ Created {} record(s) for transaction {}",
            records.len(),
            transaction.id
        );
        Ok(records)
    }

    /// One-shot read of the transactions visible on a profile, newest first.
    ///
    /// The own profile unions records created under the user ID with records
    /// other users addressed to the email; a shared profile reads the
    /// owner's ledger only.
    pub async fn list_for_profile(&self, profile: &ProfileRef) -> Result<Vec<Transaction>> {
        let repository = self.connection.create_transaction_repository();

        let mut transactions = match profile {
            ProfileRef::Own { user_id, email } => {
                let created = repository.list_by_user_id(user_id).await?;
                let addressed = repository.list_by_user_email(email).await?;
                merge_snapshots(&created, &addressed)
            }
            ProfileRef::Shared { owner_email, .. } => {
                repository.list_by_user_email(owner_email).await?
            }
        };

        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    /// Update the editable fields of one record
    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: &UpdateTransactionRequest,
        profile: &ProfileRef,
    ) -> Result<()> {
        self.validate_patch(patch)?;

        if !profile.can_edit() {
            return Err(ValidationError::ReadOnlyProfile.into());
        }

        let repository = self.connection.create_transaction_repository();
        let updated = repository.update_transaction(transaction_id, patch).await?;

        if !updated {
            return Err(anyhow!("Transaction not found: {}", transaction_id));
        }
        Ok(())
    }

    /// Delete one record
    pub async fn delete_transaction(
        &self,
        transaction_id: &str,
        profile: &ProfileRef,
    ) -> Result<()> {
        if !profile.can_edit() {
            return Err(ValidationError::ReadOnlyProfile.into());
        }

        let repository = self.connection.create_transaction_repository();
        let deleted = repository.delete_transaction(transaction_id).await?;

        if !deleted {
            return Err(anyhow!("Transaction not found: {}", transaction_id));
        }
        Ok(())
    }
}
