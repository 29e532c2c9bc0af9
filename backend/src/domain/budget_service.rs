//! Per-category monthly budgets.
//!
//! The budget list is small and device-local, so it lives in the local
//! settings store as one JSON payload rather than in the record store.
//! `BudgetBook` is the pure in-memory engine; `BudgetService` wraps it with
//! validation and persistence.

use anyhow::{Context, Result};
use chrono::Datelike;
use log::info;
use shared::{Budget, BudgetProgress, SetBudgetRequest, Transaction};

use crate::domain::errors::ValidationError;
use crate::storage::LocalStore;

/// Key the budget list is stored under in the local store
const BUDGETS_KEY: &str = "financial-budgets";

/// Insertion-ordered budget collection with at most one entry per
/// (category, month, year) tuple
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetBook {
    budgets: Vec<Budget>,
}

impl BudgetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already loaded budget list
    pub fn from_budgets(budgets: Vec<Budget>) -> Self {
        Self { budgets }
    }

    /// Set the limit for one (category, month, year).
    ///
    /// An existing entry is replaced in place, keeping its ID and position;
    /// otherwise a new entry is appended. The limit is stored as given, so
    /// callers wanting positive limits must validate first.
    pub fn upsert(&mut self, category: &str, limit: f64, month: u32, year: i32) -> Budget {
        let existing = self
            .budgets
            .iter_mut()
            .find(|b| b.category == category && b.month == month && b.year == year);

        match existing {
            Some(budget) => {
                budget.limit = limit;
                budget.clone()
            }
            None => {
                let budget = Budget::new(category, limit, month, year);
                self.budgets.push(budget.clone());
                budget
            }
        }
    }

    /// Budget for one (category, month, year), if set
    pub fn get(&self, category: &str, month: u32, year: i32) -> Option<&Budget> {
        self.budgets
            .iter()
            .find(|b| b.category == category && b.month == month && b.year == year)
    }

    /// Budgets applying to one (month, year), in insertion order
    pub fn for_month(&self, month: u32, year: i32) -> Vec<&Budget> {
        self.budgets
            .iter()
            .filter(|b| b.month == month && b.year == year)
            .collect()
    }

    /// Every stored budget, in insertion order
    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }
}

/// Derive the progress of every budget of a (month, year) against a
/// transaction set.
///
/// `spent` sums the amounts of the transactions whose category matches the
/// budget and whose date falls in the month; entries come back in budget
/// storage order.
pub fn progress_for_month(
    book: &BudgetBook,
    transactions: &[Transaction],
    month: u32,
    year: i32,
) -> Vec<BudgetProgress> {
    book.for_month(month, year)
        .into_iter()
        .map(|budget| {
            let spent: f64 = transactions
                .iter()
                .filter(|t| {
                    t.category == budget.category
                        && t.date.month0() == month
                        && t.date.year() == year
                })
                .map(|t| t.amount)
                .sum();

            BudgetProgress::from_spent(budget, spent)
        })
        .collect()
}

/// Budget service: validated upserts persisted through the local store, plus
/// progress derivation for the budget screen
#[derive(Clone)]
pub struct BudgetService<S: LocalStore> {
    store: S,
}

impl<S: LocalStore> BudgetService<S> {
    /// Create a new budget service over a local store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted budget book, treating an absent payload as empty
    pub async fn load_book(&self) -> Result<BudgetBook> {
        match self.store.get(BUDGETS_KEY).await? {
            Some(payload) => {
                let budgets: Vec<Budget> = serde_json::from_str(&payload)
                    .context("Failed to decode stored budgets")?;
                Ok(BudgetBook::from_budgets(budgets))
            }
            None => Ok(BudgetBook::new()),
        }
    }

    /// Persist the whole book under its settings key
    async fn save_book(&self, book: &BudgetBook) -> Result<()> {
        let payload = serde_json::to_string(book.budgets())?;
        self.store.put(BUDGETS_KEY, &payload).await
    }

    /// Validated upsert of one budget
    pub async fn set_budget(&self, request: &SetBudgetRequest) -> Result<Budget> {
        let category = request.category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }
        if request.limit <= 0.0 {
            return Err(ValidationError::LimitNotPositive.into());
        }
        if request.month > 11 {
            return Err(ValidationError::InvalidMonth.into());
        }

        let mut book = self.load_book().await?;
        let budget = book.upsert(category, request.limit, request.month, request.year);
        self.save_book(&book).await?;

        info!(
            "💰 Budget set for '{}' ({}/{}): limit {:.2}",
            category, request.month, request.year, request.limit
        );
        Ok(budget)
    }

    /// Budget for one (category, month, year), if set
    pub async fn budget_for(&self, category: &str, month: u32, year: i32) -> Result<Option<Budget>> {
        let book = self.load_book().await?;
        Ok(book.get(category, month, year).cloned())
    }

    /// Progress of every budget of the given month against a transaction set
    pub async fn progress_for_month(
        &self,
        transactions: &[Transaction],
        month: u32,
        year: i32,
    ) -> Result<Vec<BudgetProgress>> {
        let book = self.load_book().await?;
        Ok(progress_for_month(&book, transactions, month, year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::YamlLocalStore;
    use chrono::{TimeZone, Utc};
    use shared::TransactionKind;
    use tempfile::TempDir;

    fn create_test_service() -> (BudgetService<YamlLocalStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = YamlLocalStore::new(temp_dir.path()).unwrap();
        (BudgetService::new(store), temp_dir)
    }

    fn expense(amount: f64, category: &str, month: u32, year: i32) -> Transaction {
        Transaction {
            id: format!("transaction::expense::{}", (amount * 100.0) as u64),
            kind: TransactionKind::Expense,
            amount,
            description: "teste".to_string(),
            category: category.to_string(),
            // month is one-based here; tests pass calendar months
            date: Utc.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap(),
            payment_method: None,
            is_installment: false,
            installment_count: None,
            current_installment: None,
            original_transaction_id: None,
            user_id: Some("user-1".to_string()),
            user_email: None,
        }
    }

    fn request(category: &str, limit: f64, month: u32, year: i32) -> SetBudgetRequest {
        SetBudgetRequest {
            category: category.to_string(),
            limit,
            month,
            year,
        }
    }

    #[test]
    fn test_upsert_replaces_in_place_keeping_id() {
        let mut book = BudgetBook::new();

        let first = book.upsert("Alimentação", 500.0, 2, 2024);
        book.upsert("Transporte", 200.0, 2, 2024);
        let replaced = book.upsert("Alimentação", 650.0, 2, 2024);

        assert_eq!(replaced.id, first.id);
        assert_eq!(book.budgets().len(), 2);
        assert_eq!(book.budgets()[0].category, "Alimentação");
        assert!((book.budgets()[0].limit - 650.0).abs() < 0.001);
    }

    #[test]
    fn test_same_category_in_different_months_coexists() {
        let mut book = BudgetBook::new();

        book.upsert("Alimentação", 500.0, 2, 2024);
        book.upsert("Alimentação", 550.0, 3, 2024);
        book.upsert("Alimentação", 500.0, 2, 2025);

        assert_eq!(book.budgets().len(), 3);
        assert!(book.get("Alimentação", 2, 2024).is_some());
        assert!(book.get("Alimentação", 3, 2024).is_some());
        assert_eq!(book.get("Alimentação", 4, 2024), None);
    }

    #[test]
    fn test_progress_worked_example() {
        let mut book = BudgetBook::new();
        // Zero-based month 2 is March
        book.upsert("Alimentação", 500.0, 2, 2024);

        let transactions = vec![
            expense(450.0, "Alimentação", 3, 2024),
            expense(100.0, "Transporte", 3, 2024),
            expense(80.0, "Alimentação", 4, 2024),
        ];

        let progress = progress_for_month(&book, &transactions, 2, 2024);
        assert_eq!(progress.len(), 1);

        let p = &progress[0];
        assert!((p.spent - 450.0).abs() < 0.001);
        assert!((p.percentage - 90.0).abs() < 0.001);
        assert!(!p.is_over_budget);
        assert!(p.is_near_limit);
    }

    #[test]
    fn test_progress_over_budget() {
        let mut book = BudgetBook::new();
        book.upsert("Transporte", 100.0, 0, 2024);

        let transactions = vec![expense(130.0, "Transporte", 1, 2024)];

        let progress = progress_for_month(&book, &transactions, 0, 2024);
        assert!(progress[0].is_over_budget);
        assert!(!progress[0].is_near_limit);
        assert!((progress[0].percentage - 130.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_with_no_spending_is_zero() {
        let mut book = BudgetBook::new();
        book.upsert("Saúde", 300.0, 5, 2024);

        let progress = progress_for_month(&book, &[], 5, 2024);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].spent, 0.0);
        assert_eq!(progress[0].percentage, 0.0);
        assert!(!progress[0].is_over_budget);
        assert!(!progress[0].is_near_limit);
    }

    #[test]
    fn test_progress_entries_follow_storage_order() {
        let mut book = BudgetBook::new();
        book.upsert("Moradia", 1200.0, 6, 2024);
        book.upsert("Alimentação", 500.0, 6, 2024);
        book.upsert("Lazer", 150.0, 6, 2024);

        let progress = progress_for_month(&book, &[], 6, 2024);
        let categories: Vec<&str> = progress.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(categories, vec!["Moradia", "Alimentação", "Lazer"]);
    }

    #[tokio::test]
    async fn test_set_budget_persists_across_loads() {
        let (service, _temp_dir) = create_test_service();

        service.set_budget(&request("Alimentação", 500.0, 2, 2024)).await.unwrap();
        service.set_budget(&request("Alimentação", 650.0, 2, 2024)).await.unwrap();

        let budget = service.budget_for("Alimentação", 2, 2024).await.unwrap().unwrap();
        assert!((budget.limit - 650.0).abs() < 0.001);

        let book = service.load_book().await.unwrap();
        assert_eq!(book.budgets().len(), 1);
    }

    #[tokio::test]
    async fn test_set_budget_rejects_bad_input() {
        let (service, _temp_dir) = create_test_service();

        let err = service
            .set_budget(&request("", 500.0, 2, 2024))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyCategory)
        );

        let err = service
            .set_budget(&request("Alimentação", 0.0, 2, 2024))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::LimitNotPositive)
        );

        let err = service
            .set_budget(&request("Alimentação", 500.0, 12, 2024))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::InvalidMonth)
        );
    }

    #[tokio::test]
    async fn test_progress_through_the_service() {
        let (service, _temp_dir) = create_test_service();

        service.set_budget(&request("Alimentação", 500.0, 2, 2024)).await.unwrap();
        let transactions = vec![expense(450.0, "Alimentação", 3, 2024)];

        let progress = service
            .progress_for_month(&transactions, 2, 2024)
            .await
            .unwrap();
        assert_eq!(progress.len(), 1);
        assert!((progress[0].percentage - 90.0).abs() < 0.001);
    }
}
