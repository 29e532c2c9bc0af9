//! Installment expansion for credit purchases.
//!
//! A purchase paid in N parts is stored as N records, each due one calendar
//! month after the previous one. The expansion happens once, at creation
//! time; afterwards the parts are ordinary records.

use chrono::{DateTime, Months, Utc};
use log::debug;
use shared::Transaction;

/// Advance a date by whole calendar months, clamping the day to the end of
/// the target month when needed (Jan 31 plus one month is Feb 28 or 29)
pub fn advance_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Expand an installment purchase into its dated parts.
///
/// Part `i` (one-indexed) carries `amount / N`, a date `i - 1` months after
/// the purchase date, the ID `<original>_<i>` and the description suffixed
/// with `(i/N)`. The split is a plain division with no residual-cent
/// correction, so the parts may not sum exactly to the original amount.
///
/// A transaction that is not an installment purchase comes back as a single
/// unchanged record. Callers are responsible for only flagging transactions
/// with a part count of at least 2.
pub fn create_installments(transaction: &Transaction) -> Vec<Transaction> {
    let count = match (transaction.is_installment, transaction.installment_count) {
        (true, Some(count)) => count,
        _ => return vec![transaction.clone()],
    };

    let part_amount = transaction.amount / count as f64;
    let mut parts = Vec::with_capacity(count as usize);

    for index in 1..=count {
        let mut part = transaction.clone();
        part.id = Transaction::installment_id(&transaction.id, index);
        part.amount = part_amount;
        part.date = advance_months(transaction.date, index - 1);
        part.description = format!("{} ({}/{})", transaction.description, index, count);
        part.current_installment = Some(index);
        part.original_transaction_id = Some(transaction.id.clone());
        parts.push(part);
    }

    debug!(
        "Expanded {} into {} installment part(s)",
        transaction.id,
        parts.len()
    );
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use shared::{PaymentMethod, TransactionKind};

    fn purchase(amount: f64, count: u32, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id: "transaction::expense::1700000000000".to_string(),
            kind: TransactionKind::Expense,
            amount,
            description: "Notebook".to_string(),
            category: "Tecnologia".to_string(),
            date,
            payment_method: Some(PaymentMethod::Credit),
            is_installment: true,
            installment_count: Some(count),
            current_installment: None,
            original_transaction_id: None,
            user_id: Some("user-1".to_string()),
            user_email: None,
        }
    }

    #[test]
    fn test_three_part_split_walks_forward_month_by_month() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let parts = create_installments(&purchase(300.0, 3, date));

        assert_eq!(parts.len(), 3);
        for (i, part) in parts.iter().enumerate() {
            let index = (i + 1) as u32;
            assert!((part.amount - 100.0).abs() < 0.001);
            assert_eq!(part.id, format!("transaction::expense::1700000000000_{}", index));
            assert_eq!(part.description, format!("Notebook ({}/3)", index));
            assert_eq!(part.current_installment, Some(index));
            assert_eq!(
                part.original_transaction_id.as_deref(),
                Some("transaction::expense::1700000000000")
            );
            assert_eq!(part.installment_count, Some(3));
            assert!(part.is_installment);
        }

        assert_eq!(parts[0].date.month(), 1);
        assert_eq!(parts[1].date.month(), 2);
        assert_eq!(parts[2].date.month(), 3);
        // Day of month and time of day carry over unchanged
        assert_eq!(parts[2].date.day(), 15);
        assert_eq!(parts[0].date, date);
    }

    #[test]
    fn test_division_leaves_no_residual_correction() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let parts = create_installments(&purchase(100.0, 3, date));

        for part in &parts {
            assert!((part.amount - 100.0 / 3.0).abs() < 1e-9);
        }
        let total: f64 = parts.iter().map(|p| p.amount).sum();
        assert!((total - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_end_of_month_dates_clamp() {
        let date = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        let parts = create_installments(&purchase(600.0, 3, date));

        // 2024 is a leap year
        assert_eq!((parts[1].date.month(), parts[1].date.day()), (2, 29));
        assert_eq!((parts[2].date.month(), parts[2].date.day()), (3, 31));
    }

    #[test]
    fn test_split_crosses_year_boundaries() {
        let date = Utc.with_ymd_and_hms(2024, 11, 5, 8, 0, 0).unwrap();
        let parts = create_installments(&purchase(300.0, 3, date));

        assert_eq!((parts[0].date.year(), parts[0].date.month()), (2024, 11));
        assert_eq!((parts[1].date.year(), parts[1].date.month()), (2024, 12));
        assert_eq!((parts[2].date.year(), parts[2].date.month()), (2025, 1));
    }

    #[test]
    fn test_non_installment_transaction_passes_through_unchanged() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut single = purchase(300.0, 3, date);
        single.is_installment = false;
        single.installment_count = None;

        let records = create_installments(&single);
        assert_eq!(records, vec![single]);
    }

    #[test]
    fn test_flagged_without_count_passes_through_unchanged() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut odd = purchase(300.0, 3, date);
        odd.installment_count = None;

        let records = create_installments(&odd);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, odd.id);
    }

    #[test]
    fn test_advance_months_by_zero_is_identity() {
        let date = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap();
        assert_eq!(advance_months(date, 0), date);
    }
}
