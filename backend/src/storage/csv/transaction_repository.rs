//! # CSV Transaction Repository
//!
//! Stores the transaction ledger in a single CSV file. Reads are forgiving:
//! rows written by older builds or other clients may carry dates in several
//! shapes, and unreadable cells fall back to defaults instead of failing the
//! whole load. Writes always go through a temp file so a failed write never
//! truncates the ledger.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::{Reader, Writer};
use log::{info, warn};
use shared::{PaymentMethod, Transaction, TransactionKind, UpdateTransactionRequest};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use tokio::sync::broadcast;

use super::connection::CsvConnection;
use crate::storage::traits::TransactionStore;

const TRANSACTIONS_HEADER: &str = "id,kind,amount,description,category,date,payment_method,is_installment,installment_count,current_installment,original_transaction_id,user_id,user_email";

/// CSV-based transaction repository
#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

impl TransactionRepository {
    /// Create a new CSV transaction repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every record from the ledger file
    async fn read_transactions(&self) -> Result<Vec<Transaction>> {
        let file_path = self.connection.get_transactions_file_path();
        self.connection
            .ensure_file_exists(&file_path, TRANSACTIONS_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut transactions = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let kind = TransactionKind::parse(record.get(1).unwrap_or("expense"))
                .unwrap_or(TransactionKind::Expense);
            let payment_method = match record.get(6).unwrap_or("") {
                "" => None,
                value => PaymentMethod::parse(value).ok(),
            };

            let transaction = Transaction {
                id: record.get(0).unwrap_or("").to_string(),
                kind,
                amount: record.get(2).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                description: record.get(3).unwrap_or("").to_string(),
                category: record.get(4).unwrap_or("").to_string(),
                date: normalize_record_date(record.get(5).unwrap_or("")),
                payment_method,
                is_installment: record.get(7).unwrap_or("false") == "true",
                installment_count: parse_optional_u32(record.get(8).unwrap_or("")),
                current_installment: parse_optional_u32(record.get(9).unwrap_or("")),
                original_transaction_id: parse_optional_string(record.get(10).unwrap_or("")),
                user_id: parse_optional_string(record.get(11).unwrap_or("")),
                user_email: parse_optional_string(record.get(12).unwrap_or("")),
            };

            transactions.push(transaction);
        }

        Ok(transactions)
    }

    /// Write the full ledger back to the CSV file
    async fn write_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let file_path = self.connection.get_transactions_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(&[
                "id",
                "kind",
                "amount",
                "description",
                "category",
                "date",
                "payment_method",
                "is_installment",
                "installment_count",
                "current_installment",
                "original_transaction_id",
                "user_id",
                "user_email",
            ])?;

            for transaction in transactions {
                let row = vec![
                    transaction.id.clone(),
                    transaction.kind.as_str().to_string(),
                    transaction.amount.to_string(),
                    transaction.description.clone(),
                    transaction.category.clone(),
                    transaction.date.to_rfc3339(),
                    transaction
                        .payment_method
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                    transaction.is_installment.to_string(),
                    transaction
                        .installment_count
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                    transaction
                        .current_installment
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                    transaction.original_transaction_id.clone().unwrap_or_default(),
                    transaction.user_id.clone().unwrap_or_default(),
                    transaction.user_email.clone().unwrap_or_default(),
                ];
                csv_writer.write_record(&row)?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

/// Normalize a stored date cell into a canonical UTC timestamp.
///
/// Records written by other clients may carry the date as an RFC 3339 string,
/// a bare calendar date, an epoch number in seconds or milliseconds, or a
/// structured value with a `seconds` field. Anything unreadable falls back to
/// the current time so one bad cell never hides a record.
pub fn normalize_record_date(raw: &str) -> DateTime<Utc> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        warn!("🕐 Empty transaction date, defaulting to now");
        return Utc::now();
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return date.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive_datetime) = naive.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&naive_datetime);
        }
    }

    if let Ok(number) = trimmed.parse::<i64>() {
        return epoch_to_datetime(number);
    }

    // Structured export form such as {"seconds":1702516122,"nanoseconds":0}
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(seconds) = value.get("seconds").and_then(|s| s.as_i64()) {
                if let Some(date) = Utc.timestamp_opt(seconds, 0).single() {
                    return date;
                }
            }
        }
    }

    warn!("🕐 Could not parse transaction date '{}', defaulting to now", trimmed);
    Utc::now()
}

/// Interpret a bare epoch number, treating large magnitudes as milliseconds.
///
/// The 100_000_000_000 cutoff falls in March 1973 when read as milliseconds
/// and in the year 5138 when read as seconds, so timestamps in either unit
/// land on the correct side of it for any date this app can record.
fn epoch_to_datetime(value: i64) -> DateTime<Utc> {
    let parsed = if value.abs() >= 100_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    };

    match parsed {
        Some(date) => date,
        None => {
            warn!("🕐 Epoch value {} out of range, defaulting to now", value);
            Utc::now()
        }
    }
}

fn parse_optional_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_optional_u32(value: &str) -> Option<u32> {
    value.parse::<u32>().ok()
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.read_transactions().await?;
        transactions.push(transaction.clone());

        // Keep the ledger file in chronological order
        transactions.sort_by(|a, b| a.date.cmp(&b.date));

        self.write_transactions(&transactions).await?;
        self.connection.notify_transactions_changed();

        info!("✅ Stored transaction: {}", transaction.id);
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let transactions = self.read_transactions().await?;
        Ok(transactions.into_iter().find(|t| t.id == transaction_id))
    }

    async fn list_by_user_id(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let transactions = self.read_transactions().await?;
        Ok(transactions
            .into_iter()
            .filter(|t| t.user_id.as_deref() == Some(user_id))
            .collect())
    }

    async fn list_by_user_email(&self, user_email: &str) -> Result<Vec<Transaction>> {
        let transactions = self.read_transactions().await?;
        Ok(transactions
            .into_iter()
            .filter(|t| t.user_email.as_deref() == Some(user_email))
            .collect())
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: &UpdateTransactionRequest,
    ) -> Result<bool> {
        let mut transactions = self.read_transactions().await?;

        let transaction = match transactions.iter_mut().find(|t| t.id == transaction_id) {
            Some(transaction) => transaction,
            None => {
                warn!("❌ Transaction not found for update: {}", transaction_id);
                return Ok(false);
            }
        };

        transaction.amount = patch.amount;
        transaction.description = patch.description.clone();
        transaction.category = patch.category.clone();

        self.write_transactions(&transactions).await?;
        self.connection.notify_transactions_changed();

        info!("✅ Updated transaction: {}", transaction_id);
        Ok(true)
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        let mut transactions = self.read_transactions().await?;
        let initial_count = transactions.len();

        transactions.retain(|t| t.id != transaction_id);

        if transactions.len() == initial_count {
            warn!("❌ Transaction not found for deletion: {}", transaction_id);
            return Ok(false);
        }

        self.write_transactions(&transactions).await?;
        self.connection.notify_transactions_changed();

        info!("🗑️ Deleted transaction: {}", transaction_id);
        Ok(true)
    }

    fn change_events(&self) -> broadcast::Receiver<()> {
        self.connection.transaction_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repository() -> (TransactionRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (TransactionRepository::new(connection), temp_dir)
    }

    fn sample_transaction(id: &str, user_id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind: TransactionKind::Expense,
            amount: 50.0,
            description: "Mercado".to_string(),
            category: "Alimentação".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            payment_method: Some(PaymentMethod::Debit),
            is_installment: false,
            installment_count: None,
            current_installment: None,
            original_transaction_id: None,
            user_id: Some(user_id.to_string()),
            user_email: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_transaction() {
        let (repo, _temp_dir) = create_test_repository();
        let transaction = sample_transaction("transaction::expense::1", "user-1");

        repo.store_transaction(&transaction).await.unwrap();
        let loaded = repo
            .get_transaction("transaction::expense::1")
            .await
            .unwrap();

        assert_eq!(loaded, Some(transaction));
    }

    #[tokio::test]
    async fn test_optional_fields_survive_a_round_trip() {
        let (repo, _temp_dir) = create_test_repository();
        let mut transaction = sample_transaction("transaction::expense::2_1", "user-1");
        transaction.payment_method = Some(PaymentMethod::Credit);
        transaction.is_installment = true;
        transaction.installment_count = Some(3);
        transaction.current_installment = Some(1);
        transaction.original_transaction_id = Some("transaction::expense::2".to_string());
        transaction.user_id = None;
        transaction.user_email = Some("amigo@example.com".to_string());

        repo.store_transaction(&transaction).await.unwrap();
        let loaded = repo
            .get_transaction("transaction::expense::2_1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.installment_count, Some(3));
        assert_eq!(loaded.current_installment, Some(1));
        assert_eq!(
            loaded.original_transaction_id.as_deref(),
            Some("transaction::expense::2")
        );
        assert_eq!(loaded.user_id, None);
        assert_eq!(loaded.user_email.as_deref(), Some("amigo@example.com"));
    }

    #[tokio::test]
    async fn test_list_filters_by_user_id_and_email() {
        let (repo, _temp_dir) = create_test_repository();

        let mine = sample_transaction("transaction::expense::10", "user-1");
        let theirs = sample_transaction("transaction::expense::11", "user-2");
        let mut addressed = sample_transaction("transaction::expense::12", "user-2");
        addressed.user_id = None;
        addressed.user_email = Some("eu@example.com".to_string());

        repo.store_transaction(&mine).await.unwrap();
        repo.store_transaction(&theirs).await.unwrap();
        repo.store_transaction(&addressed).await.unwrap();

        let by_id = repo.list_by_user_id("user-1").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, "transaction::expense::10");

        let by_email = repo.list_by_user_email("eu@example.com").await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id, "transaction::expense::12");
    }

    #[tokio::test]
    async fn test_update_transaction_changes_editable_fields() {
        let (repo, _temp_dir) = create_test_repository();
        let transaction = sample_transaction("transaction::expense::20", "user-1");
        repo.store_transaction(&transaction).await.unwrap();

        let patch = UpdateTransactionRequest {
            amount: 75.5,
            description: "Feira".to_string(),
            category: "Alimentação".to_string(),
        };
        let updated = repo
            .update_transaction("transaction::expense::20", &patch)
            .await
            .unwrap();
        assert!(updated);

        let loaded = repo
            .get_transaction("transaction::expense::20")
            .await
            .unwrap()
            .unwrap();
        assert!((loaded.amount - 75.5).abs() < 0.001);
        assert_eq!(loaded.description, "Feira");
        // Everything else stays as stored
        assert_eq!(loaded.date, transaction.date);
        assert_eq!(loaded.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_update_missing_transaction_returns_false() {
        let (repo, _temp_dir) = create_test_repository();

        let patch = UpdateTransactionRequest {
            amount: 1.0,
            description: "x".to_string(),
            category: "Outros".to_string(),
        };
        let updated = repo.update_transaction("missing", &patch).await.unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_transaction() {
        let (repo, _temp_dir) = create_test_repository();
        let transaction = sample_transaction("transaction::expense::30", "user-1");
        repo.store_transaction(&transaction).await.unwrap();

        assert!(repo.delete_transaction("transaction::expense::30").await.unwrap());
        assert!(!repo.delete_transaction("transaction::expense::30").await.unwrap());
        assert_eq!(
            repo.get_transaction("transaction::expense::30").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_mutations_notify_subscribers() {
        let (repo, _temp_dir) = create_test_repository();
        let mut events = repo.change_events();

        let transaction = sample_transaction("transaction::expense::40", "user-1");
        repo.store_transaction(&transaction).await.unwrap();

        let received =
            tokio::time::timeout(std::time::Duration::from_secs(1), events.recv()).await;
        assert!(received.is_ok(), "store never notified subscribers");
    }

    #[test]
    fn test_normalize_rfc3339_date() {
        let parsed = normalize_record_date("2023-12-14T01:08:42+00:00");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 14, 1, 8, 42).unwrap());
    }

    #[test]
    fn test_normalize_bare_calendar_date() {
        let parsed = normalize_record_date("2024-03-15");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_normalize_epoch_seconds_and_milliseconds() {
        let expected = Utc.with_ymd_and_hms(2023, 12, 14, 1, 8, 42).unwrap();
        assert_eq!(normalize_record_date("1702516122"), expected);
        assert_eq!(normalize_record_date("1702516122000"), expected);
    }

    #[test]
    fn test_normalize_structured_seconds_value() {
        let parsed = normalize_record_date("{\"seconds\":1702516122,\"nanoseconds\":0}");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 14, 1, 8, 42).unwrap());
    }

    #[test]
    fn test_normalize_garbage_defaults_to_now() {
        let before = Utc::now();
        let parsed = normalize_record_date("not a date at all");
        let after = Utc::now();

        assert!(parsed >= before && parsed <= after);
    }

    #[tokio::test]
    async fn test_rows_with_unreadable_cells_still_load() {
        let (repo, _temp_dir) = create_test_repository();
        let file_path = repo.connection.get_transactions_file_path();

        let mut content = format!("{}\n", TRANSACTIONS_HEADER);
        content.push_str(
            "transaction::expense::50,expense,abc,Luz,Moradia,2024-01-10,pix,false,,,,user-1,\n",
        );
        std::fs::write(&file_path, content).unwrap();

        let loaded = repo.list_by_user_id("user-1").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].amount, 0.0);
        assert_eq!(loaded[0].payment_method, None);
    }
}
