//! Income and expense aggregation over a transaction set.
//!
//! These are pure functions; the caller decides which set to aggregate, so
//! the same code serves the full ledger and a month-filtered slice alike.

use chrono::Datelike;
use shared::{FinancialSummary, MonthStatistics, Transaction, TransactionKind};

/// Total the incomes and expenses of a transaction set.
///
/// An empty set yields all zeros. The balance is always income minus
/// expenses, and may be negative.
pub fn calculate_summary(transactions: &[Transaction]) -> FinancialSummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expenses += transaction.amount,
        }
    }

    FinancialSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}

/// Keep only the transactions dated in the given month.
///
/// `month` is zero-based (0 = January). Filtering an already filtered set by
/// the same month returns the same set.
pub fn filter_by_month(transactions: &[Transaction], month: u32, year: i32) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.date.month0() == month && t.date.year() == year)
        .cloned()
        .collect()
}

/// Keep only the transactions in the given category
pub fn filter_by_category(transactions: &[Transaction], category: &str) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.category == category)
        .cloned()
        .collect()
}

/// Count the records of a (usually month-filtered) set for the statistics card
pub fn month_statistics(transactions: &[Transaction]) -> MonthStatistics {
    MonthStatistics {
        transaction_count: transactions.len(),
        income_count: transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .count(),
        expense_count: transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .count(),
        installment_count: transactions.iter().filter(|t| t.is_installment).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn transaction(kind: TransactionKind, amount: f64, category: &str, year: i32, month: u32) -> Transaction {
        Transaction {
            id: format!("transaction::{}::{}", kind.as_str(), amount as u64),
            kind,
            amount,
            description: "teste".to_string(),
            category: category.to_string(),
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

    #[test]
    fn test_summary_of_empty_set_is_all_zeros() {
        let summary = calculate_summary(&[]);

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
    }

    #[test]
    fn test_summary_totals_income_and_expenses() {
        let transactions = vec![
            transaction(TransactionKind::Income, 1000.0, "Salário", 2024, 3),
            transaction(TransactionKind::Expense, 300.0, "Alimentação", 2024, 3),
            transaction(TransactionKind::Expense, 200.0, "Transporte", 2024, 3),
        ];

        let summary = calculate_summary(&transactions);

        assert!((summary.total_income - 1000.0).abs() < 0.001);
        assert!((summary.total_expenses - 500.0).abs() < 0.001);
        assert!((summary.balance - 500.0).abs() < 0.001);
    }

    #[test]
    fn test_balance_can_go_negative() {
        let transactions = vec![
            transaction(TransactionKind::Income, 100.0, "Salário", 2024, 3),
            transaction(TransactionKind::Expense, 250.0, "Moradia", 2024, 3),
        ];

        let summary = calculate_summary(&transactions);
        assert!((summary.balance - (-150.0)).abs() < 0.001);
    }

    #[test]
    fn test_filter_by_month_is_idempotent() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 10.0, "Outros", 2024, 1),
            transaction(TransactionKind::Expense, 20.0, "Outros", 2024, 2),
            transaction(TransactionKind::Expense, 30.0, "Outros", 2023, 2),
        ];

        // Zero-based: month 1 is February
        let february = filter_by_month(&transactions, 1, 2024);
        assert_eq!(february.len(), 1);
        assert!((february[0].amount - 20.0).abs() < 0.001);

        let again = filter_by_month(&february, 1, 2024);
        assert_eq!(again, february);
    }

    #[test]
    fn test_filter_by_category() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 10.0, "Alimentação", 2024, 1),
            transaction(TransactionKind::Expense, 20.0, "Transporte", 2024, 1),
            transaction(TransactionKind::Income, 30.0, "Alimentação", 2024, 1),
        ];

        let food = filter_by_category(&transactions, "Alimentação");
        assert_eq!(food.len(), 2);
    }

    #[test]
    fn test_month_statistics_counts() {
        let mut installment = transaction(TransactionKind::Expense, 50.0, "Tecnologia", 2024, 3);
        installment.is_installment = true;

        let transactions = vec![
            transaction(TransactionKind::Income, 1000.0, "Salário", 2024, 3),
            transaction(TransactionKind::Expense, 300.0, "Alimentação", 2024, 3),
            installment,
        ];

        let stats = month_statistics(&transactions);
        assert_eq!(stats.transaction_count, 3);
        assert_eq!(stats.income_count, 1);
        assert_eq!(stats.expense_count, 2);
        assert_eq!(stats.installment_count, 1);
    }
}
