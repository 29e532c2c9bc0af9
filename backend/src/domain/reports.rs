//! Chart-ready aggregation series derived from the transaction set.
//!
//! Every function here is pure: it takes the merged transaction set and
//! returns plain data the rendering layer can draw directly, colours
//! included. Grouping by month uses the sortable `YYYY-MM` key from the
//! shared crate, so lexicographic order is chronological order.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use shared::{
    month_key, month_label, BalanceTrend, CategoryTotal, ExpensePoint, InstallmentForecast,
    MonthlyTotal, Transaction, TransactionKind, TrendHighlight, TrendPoint,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Marker colour when the month under the cursor held or improved the balance
pub const TREND_GREEN: &str = "#22c55e";
/// Marker colour when the month under the cursor lost ground
pub const TREND_RED: &str = "#ef4444";
/// Neutral series colour
pub const TREND_GRAY: &str = "#a3a3a3";

/// Fixed chart colours for the built-in categories
static CATEGORY_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Alimentação", "#FF6B6B"),
        ("Transporte", "#4ECDC4"),
        ("Moradia", "#45B7D1"),
        ("Saúde", "#96CEB4"),
        ("Educação", "#FECA57"),
        ("Entretenimento", "#FF9FF3"),
        ("Roupas", "#54A0FF"),
        ("Tecnologia", "#5F27CD"),
        ("Salário", "#00D2D3"),
        ("Freelance", "#FF9F43"),
        ("Investimentos", "#10AC84"),
        ("Vendas", "#EE5A24"),
        ("Outros", "#9C88FF"),
    ])
});

/// Chart colour assignment for one rendering session.
///
/// Built-in categories use the fixed table. Unknown names receive a pastel
/// colour derived from a hash of the name, remembered so the same category
/// keeps its colour for the lifetime of the map.
#[derive(Debug, Default)]
pub struct CategoryColorMap {
    assigned: HashMap<String, String>,
}

impl CategoryColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour for a category name, assigning one on first sight
    pub fn color_for(&mut self, category: &str) -> String {
        if let Some(color) = CATEGORY_COLORS.get(category) {
            return (*color).to_string();
        }

        if let Some(color) = self.assigned.get(category) {
            return color.clone();
        }

        let color = pastel_color(category);
        self.assigned.insert(category.to_string(), color.clone());
        color
    }
}

/// Deterministic pastel colour for a category outside the fixed table
fn pastel_color(category: &str) -> String {
    let mut hasher = DefaultHasher::new();
    category.hash(&mut hasher);
    let hue = hasher.finish() % 360;
    format!("hsl({}, 70%, 70%)", hue)
}

/// Expense totals grouped by category, in first-seen order
pub fn category_breakdown(
    transactions: &[Transaction],
    colors: &mut CategoryColorMap,
) -> Vec<CategoryTotal> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        if !totals.contains_key(&transaction.category) {
            order.push(transaction.category.clone());
        }
        *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
    }

    order
        .into_iter()
        .map(|category| {
            let total = totals[&category];
            let color = colors.color_for(&category);
            CategoryTotal {
                category,
                total,
                color,
            }
        })
        .collect()
}

/// Future installment commitments: expense parts due on or after `now`,
/// grouped by due month in ascending order, with the overall total due
pub fn upcoming_installments(transactions: &[Transaction], now: DateTime<Utc>) -> InstallmentForecast {
    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut total_due = 0.0;

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense
            || !transaction.is_installment
            || transaction.date < now
        {
            continue;
        }

        *totals.entry(month_key(&transaction.date)).or_insert(0.0) += transaction.amount;
        total_due += transaction.amount;
    }

    let mut months: Vec<MonthlyTotal> = totals
        .into_iter()
        .map(|(key, total)| MonthlyTotal {
            label: month_label(&key),
            key,
            total,
        })
        .collect();
    months.sort_by(|a, b| a.key.cmp(&b.key));

    InstallmentForecast { months, total_due }
}

/// Net balance per month, ascending, with the current month marked green when
/// its balance held or improved on the previous month and red when it fell.
///
/// No marker is produced when the current month is absent from the data or is
/// the earliest bucket.
pub fn monthly_balance_trend(transactions: &[Transaction], now: DateTime<Utc>) -> BalanceTrend {
    let mut balances: HashMap<String, f64> = HashMap::new();

    for transaction in transactions {
        let entry = balances.entry(month_key(&transaction.date)).or_insert(0.0);
        match transaction.kind {
            TransactionKind::Income => *entry += transaction.amount,
            TransactionKind::Expense => *entry -= transaction.amount,
        }
    }

    let mut points: Vec<TrendPoint> = balances
        .into_iter()
        .map(|(key, balance)| TrendPoint {
            label: month_label(&key),
            key,
            balance,
        })
        .collect();
    points.sort_by(|a, b| a.key.cmp(&b.key));

    let current_key = month_key(&now);
    let current = points
        .iter()
        .position(|p| p.key == current_key)
        .and_then(|index| {
            if index == 0 {
                return None;
            }
            let color = if points[index].balance >= points[index - 1].balance {
                TREND_GREEN
            } else {
                TREND_RED
            };
            Some(TrendHighlight {
                index,
                color: color.to_string(),
            })
        });

    BalanceTrend { points, current }
}

/// Expense totals per month, ascending, each coloured against the previous
/// month: green when spending fell, red when it rose, gray when unchanged.
/// The earliest month has no predecessor and is gray.
pub fn monthly_expense_trend(transactions: &[Transaction]) -> Vec<ExpensePoint> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        *totals.entry(month_key(&transaction.date)).or_insert(0.0) += transaction.amount;
    }

    let mut keys: Vec<String> = totals.keys().cloned().collect();
    keys.sort();

    let mut points = Vec::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        let total = totals[key];
        let color = if index == 0 {
            TREND_GRAY
        } else {
            let previous = totals[&keys[index - 1]];
            if total < previous {
                TREND_GREEN
            } else if total > previous {
                TREND_RED
            } else {
                TREND_GRAY
            }
        };

        points.push(ExpensePoint {
            key: key.clone(),
            label: month_label(key),
            total,
            color: color.to_string(),
        });
    }

    points
}
