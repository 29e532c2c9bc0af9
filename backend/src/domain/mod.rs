//! # Domain Module
//!
//! Contains all business logic for the cashflow tracker.
//!
//! This module encapsulates the rules that define how transactions are
//! recorded, split, aggregated and shared. It operates independently of any
//! specific UI framework or storage mechanism.
//!
//! ## Module Organization
//!
//! - **transaction_service**: Form validation, installment expansion and record CRUD
//! - **installments**: Splitting a credit purchase into monthly parts
//! - **summary**: Income and expense totals, month filtering, statistics
//! - **budget_service**: Per-category monthly spending ceilings and their progress
//! - **reports**: Chart-ready aggregation series with colour assignment
//! - **feed**: The live merged view over the record store
//! - **profile_service**: Sharing ledgers between users by email
//! - **category_service**: User-defined categories on top of the built-in lists
//! - **session**: Theme and active profile persistence
//!
//! ## Business Rules
//!
//! - Transactions carry a positive amount and a non-empty description and category
//! - Installments require credit payment and between 2 and 13 parts
//! - A budget applies to exactly one (category, month, year) and is never duplicated
//! - Records on someone else's ledger are addressed by the owner's email
//! - The merged view deduplicates by record ID, letting the email query win

pub mod budget_service;
pub mod category_service;
pub mod errors;
pub mod feed;
pub mod installments;
pub mod profile_service;
pub mod reports;
pub mod session;
pub mod summary;
pub mod transaction_service;

pub use budget_service::{progress_for_month, BudgetBook, BudgetService};
pub use category_service::CategoryService;
pub use errors::ValidationError;
pub use feed::{merge_snapshots, LedgerFeed};
pub use installments::{advance_months, create_installments};
pub use profile_service::ProfileService;
pub use reports::{
    category_breakdown, monthly_balance_trend, monthly_expense_trend, upcoming_installments,
    CategoryColorMap,
};
pub use session::SessionService;
pub use summary::{calculate_summary, filter_by_category, filter_by_month, month_statistics};
pub use transaction_service::TransactionService;
