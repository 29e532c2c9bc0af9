use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fixed income categories offered by the transaction form
pub const INCOME_CATEGORIES: &[&str] = &[
    "Salário",
    "Freelance",
    "Investimentos",
    "Vendas",
    "Outros",
];

/// Fixed expense categories offered by the transaction form
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Entretenimento",
    "Roupas",
    "Tecnologia",
    "Outros",
];

/// Month names for the month filter dropdown
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// One financial movement belonging to exactly one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID in format: "transaction::<income|expense>::epoch_millis";
    /// installment parts append "_<index>" to the original ID
    pub id: String,
    pub kind: TransactionKind,
    /// Positive amount in the ledger currency
    pub amount: f64,
    pub description: String,
    pub category: String,
    /// Canonical timestamp after date normalization
    pub date: DateTime<Utc>,
    pub payment_method: Option<PaymentMethod>,
    /// When true, this record is one part of a purchase paid over several months
    pub is_installment: bool,
    /// Total number of parts (present only on installment records, always >= 2)
    pub installment_count: Option<u32>,
    /// One-indexed position of this part within the purchase
    pub current_installment: Option<u32>,
    /// ID of the logical purchase this part was split from
    pub original_transaction_id: Option<String>,
    /// Owning user ID (set for records created on the user's own ledger)
    pub user_id: Option<String>,
    /// Owning email (set for records addressed to a shared ledger)
    pub user_email: Option<String>,
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the stored string form back into a kind
    pub fn parse(value: &str) -> Result<Self, TransactionKindError> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(TransactionKindError::UnknownKind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionKindError {
    UnknownKind,
}

impl fmt::Display for TransactionKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKindError::UnknownKind => write!(f, "Unknown transaction kind"),
        }
    }
}

impl std::error::Error for TransactionKindError {}

/// How a transaction was paid; installments are only possible on credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn parse(value: &str) -> Result<Self, PaymentMethodError> {
        match value {
            "cash" => Ok(PaymentMethod::Cash),
            "debit" => Ok(PaymentMethod::Debit),
            "credit" => Ok(PaymentMethod::Credit),
            _ => Err(PaymentMethodError::UnknownMethod),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentMethodError {
    UnknownMethod,
}

impl fmt::Display for PaymentMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethodError::UnknownMethod => write!(f, "Unknown payment method"),
        }
    }
}

impl std::error::Error for PaymentMethodError {}

impl Transaction {
    /// Generate a transaction ID from the kind and a millisecond timestamp
    pub fn generate_id(kind: TransactionKind, epoch_millis: u64) -> String {
        format!("transaction::{}::{}", kind.as_str(), epoch_millis)
    }

    /// Derive the ID of the i-th installment part from the original purchase ID
    pub fn installment_id(original_id: &str, index: u32) -> String {
        format!("{}_{}", original_id, index)
    }
}

/// Form input for creating a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransactionRequest {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: String,
    /// Optional date override - uses current time if not provided
    pub date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub is_installment: bool,
    pub installment_count: Option<u32>,
}

/// Editable fields of an existing transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub amount: f64,
    pub description: String,
    pub category: String,
}

/// Configuration for transaction form validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFormConfig {
    pub max_description_length: usize,
    pub min_installments: u32,
    pub max_installments: u32,
}

impl Default for TransactionFormConfig {
    fn default() -> Self {
        Self {
            max_description_length: 256,
            min_installments: 2,
            max_installments: 13,
        }
    }
}

/// A spending ceiling for one category in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    /// Maximum spend for the month, in the ledger currency
    pub limit: f64,
    /// Zero-based month index (0 = January)
    pub month: u32,
    pub year: i32,
}

impl Budget {
    /// Create a budget with a fresh random ID
    pub fn new(category: &str, limit: f64, month: u32, year: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: category.to_string(),
            limit,
            month,
            year,
        }
    }
}

/// Derived view of how far a budget has been consumed; recomputed on every
/// read, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    /// spent / limit * 100, or 0 when the limit is 0
    pub percentage: f64,
    pub is_over_budget: bool,
    /// True when the percentage sits in the warning band [80, 100)
    pub is_near_limit: bool,
}

impl BudgetProgress {
    /// Derive the progress figures for one budget against the amount spent
    pub fn from_spent(budget: &Budget, spent: f64) -> Self {
        let percentage = if budget.limit > 0.0 {
            (spent / budget.limit) * 100.0
        } else {
            0.0
        };
        Self {
            category: budget.category.clone(),
            spent,
            limit: budget.limit,
            percentage,
            is_over_budget: spent > budget.limit,
            is_near_limit: percentage >= 80.0 && percentage < 100.0,
        }
    }
}

/// Form input for setting a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBudgetRequest {
    pub category: String,
    pub limit: f64,
    /// Zero-based month index (0 = January)
    pub month: u32,
    pub year: i32,
}

/// Access level granted to another user on a shared ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharePermission {
    View,
    Edit,
}

impl SharePermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharePermission::View => "view",
            SharePermission::Edit => "edit",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SharePermissionError> {
        match value {
            "view" => Ok(SharePermission::View),
            "edit" => Ok(SharePermission::Edit),
            _ => Err(SharePermissionError::UnknownPermission),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SharePermissionError {
    UnknownPermission,
}

impl fmt::Display for SharePermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharePermissionError::UnknownPermission => write!(f, "Unknown share permission"),
        }
    }
}

impl std::error::Error for SharePermissionError {}

/// Grant giving one user access to another user's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub id: String,
    /// Email of the user receiving access
    pub email: String,
    pub permission: SharePermission,
    /// Email of the ledger owner who created the grant
    pub owner_email: String,
}

impl ShareGrant {
    /// Create a grant with a fresh random ID
    pub fn new(email: &str, permission: SharePermission, owner_email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            permission,
            owner_email: owner_email.to_string(),
        }
    }
}

/// Form input for granting ledger access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantAccessRequest {
    pub email: String,
    pub permission: SharePermission,
}

/// Identifies whose ledger the application is currently displaying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileRef {
    /// The signed-in user's own ledger
    Own { user_id: String, email: String },
    /// A ledger another user shared, addressed by the owner's email
    Shared {
        owner_email: String,
        permission: SharePermission,
    },
}

impl ProfileRef {
    pub fn is_own(&self) -> bool {
        matches!(self, ProfileRef::Own { .. })
    }

    /// Whether the current user may create or modify records on this ledger
    pub fn can_edit(&self) -> bool {
        match self {
            ProfileRef::Own { .. } => true,
            ProfileRef::Shared { permission, .. } => *permission == SharePermission::Edit,
        }
    }
}

/// One row in the profile selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub label: String,
    pub owner_email: String,
    pub permission: SharePermission,
    pub is_own: bool,
}

/// A user-defined category, available alongside the fixed lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCategory {
    pub id: String,
    pub name: String,
    /// User ID of the owner
    pub owner: String,
}

impl CustomCategory {
    /// Create a category with a fresh random ID
    pub fn new(name: &str, owner: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
        }
    }
}

/// UI colour scheme flag, persisted between sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ThemeError> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ThemeError::UnknownTheme),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeError {
    UnknownTheme,
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::UnknownTheme => write!(f, "Unknown theme"),
        }
    }
}

impl std::error::Error for ThemeError {}

/// Income, expense and balance totals for one filtered transaction set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

/// Record counts for the statistics card of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatistics {
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub installment_count: usize,
}

/// One slice of the category breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    /// Hex or HSL colour string for rendering
    pub color: String,
}

/// One bar of a per-month total series, keyed "YYYY-MM" and labelled "MM/YY"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub key: String,
    pub label: String,
    pub total: f64,
}

/// Future installment commitments grouped by due month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentForecast {
    pub months: Vec<MonthlyTotal>,
    /// Sum of every future installment amount
    pub total_due: f64,
}

/// One point of the monthly balance trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub key: String,
    pub label: String,
    pub balance: f64,
}

/// Marker for the current month within the balance trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendHighlight {
    pub index: usize,
    /// Green when the balance held or improved, red when it fell
    pub color: String,
}

/// Monthly balance trend series with an optional current-month marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceTrend {
    pub points: Vec<TrendPoint>,
    pub current: Option<TrendHighlight>,
}

/// One bar of the monthly expense trend, coloured against the previous month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePoint {
    pub key: String,
    pub label: String,
    pub total: f64,
    pub color: String,
}

/// Format an amount as Brazilian real, e.g. "R$ 1.234,56"
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = match fixed.split_once('.') {
        Some((whole, cents)) => (whole, cents),
        None => (fixed.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-R$ {},{}", grouped, cents)
    } else {
        format!("R$ {},{}", grouped, cents)
    }
}

/// Format a date for list display, e.g. "25/03/2025"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Grouping key for one month, e.g. "2025-03"; lexicographic order is
/// chronological order
pub fn month_key(date: &DateTime<Utc>) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Chart label for a month key, e.g. "2025-03" becomes "03/25"
pub fn month_label(key: &str) -> String {
    match key.split_once('-') {
        Some((year, month)) if year.len() >= 4 => format!("{}/{}", month, &year[2..]),
        _ => key.to_string(),
    }
}

/// Month name for a zero-based month index
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month as usize)
        .copied()
        .unwrap_or("Inválido")
}

/// Years offered by the month filter dropdown, two either side of the given year
pub fn year_window(year: i32) -> Vec<i32> {
    (year - 2..=year + 2).collect()
}

/// Default category list for a transaction kind
pub fn default_categories(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => INCOME_CATEGORIES,
        TransactionKind::Expense => EXPENSE_CATEGORIES,
    }
}
