//! Accounting transactions: code generation, automatic entries created by
//! payments and daily reports, summaries and period reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::order::{self, PaymentStatus};
use crate::models::transaction::{self, TransactionType};

/// Categories written by automatic entries
pub const CATEGORY_ORDER_PAYMENT: &str = "Order Payment";
pub const CATEGORY_SETORAN_LOKET: &str = "Setoran Loket";
pub const CATEGORY_SETORAN_KASIR: &str = "Setoran Kasir";
pub const CATEGORY_BELANJA: &str = "Belanja Operasional";
pub const CATEGORY_ADMIN_FEE: &str = "Admin Fee";

/// Maximum rows scanned by summaries and period reports
const REPORT_SCAN_LIMIT: u64 = 10_000;

/// Build a unique-looking code: `PREFIX` + UTC timestamp + 6 random digits
pub fn generate_code(prefix: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}{}{:06}", prefix, Utc::now().format("%Y%m%d%H%M%S"), suffix)
}

/// A transaction to insert
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub business_id: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub order_id: Option<String>,
    pub created_by: String,
}

impl NewTransaction {
    /// Cash income entry
    pub fn income(
        business_id: impl Into<String>,
        category: &str,
        description: impl Into<String>,
        amount: f64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            transaction_type: TransactionType::Income,
            category: category.to_string(),
            description: description.into(),
            amount,
            payment_method: Some("cash".to_string()),
            reference_number: None,
            order_id: None,
            created_by: created_by.into(),
        }
    }

    /// Cash expense entry
    pub fn expense(
        business_id: impl Into<String>,
        category: &str,
        description: impl Into<String>,
        amount: f64,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            ..Self::income(business_id, category, description, amount, created_by)
        }
    }

    pub fn reference(mut self, reference_number: impl Into<String>) -> Self {
        self.reference_number = Some(reference_number.into());
        self
    }

    pub fn for_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn paid_with(mut self, payment_method: Option<String>) -> Self {
        if payment_method.is_some() {
            self.payment_method = payment_method;
        }
        self
    }
}

/// Insert a transaction with a freshly generated code
pub async fn record_transaction<C: ConnectionTrait>(
    db: &C,
    new: NewTransaction,
) -> Result<transaction::Model> {
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Transaction amount must be positive".to_string(),
        ));
    }

    let model = transaction::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        transaction_code: Set(generate_code("TXN")),
        business_id: Set(new.business_id),
        transaction_type: Set(new.transaction_type.to_string()),
        category: Set(new.category),
        description: Set(new.description),
        amount: Set(new.amount),
        payment_method: Set(new.payment_method),
        reference_number: Set(new.reference_number),
        order_id: Set(new.order_id),
        created_by: Set(new.created_by),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    tracing::debug!(
        "Recorded {} transaction {} ({})",
        model.transaction_type,
        model.transaction_code,
        model.amount
    );
    Ok(model)
}

/// Insert the entry only when the amount is positive
pub async fn record_if_positive<C: ConnectionTrait>(
    db: &C,
    new: NewTransaction,
) -> Result<Option<transaction::Model>> {
    if new.amount > 0.0 {
        record_transaction(db, new).await.map(Some)
    } else {
        Ok(None)
    }
}

/// Filters shared by transaction listings and accounting reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub business_id: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Round a money figure to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Start of a day in UTC
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Transactions matching a filter, newest first
pub async fn find_transactions<C: ConnectionTrait>(
    db: &C,
    filter: &TransactionFilter,
    offset: u64,
    limit: u64,
) -> Result<Vec<transaction::Model>> {
    let mut select = transaction::Entity::find();

    if let Some(business_id) = &filter.business_id {
        select = select.filter(transaction::Column::BusinessId.eq(business_id.as_str()));
    }
    if let Some(transaction_type) = &filter.transaction_type {
        select = select.filter(transaction::Column::TransactionType.eq(transaction_type.as_str()));
    }
    if let Some(category) = &filter.category {
        select = select.filter(transaction::Column::Category.eq(category.as_str()));
    }
    if let Some(start) = filter.start_date {
        select = select.filter(transaction::Column::CreatedAt.gte(day_start(start)));
    }
    if let Some(end) = filter.end_date {
        select = select.filter(transaction::Column::CreatedAt.lt(day_start(end) + Duration::days(1)));
    }

    Ok(select
        .order_by_desc(transaction::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub income: f64,
    pub expense: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodTotals {
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountingSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_transfer: f64,
    pub total_commission: f64,
    pub balance: f64,
    pub transaction_count: u64,
    pub categories: BTreeMap<String, CategoryTotals>,
    pub payment_methods: BTreeMap<String, MethodTotals>,
}

/// Totals per type, per category and per payment method
pub fn summarize(transactions: &[transaction::Model]) -> AccountingSummary {
    let mut summary = AccountingSummary::default();

    for txn in transactions {
        let kind = TransactionType::parse(&txn.transaction_type);
        match kind {
            Some(TransactionType::Income) => summary.total_income += txn.amount,
            Some(TransactionType::Expense) => summary.total_expense += txn.amount,
            Some(TransactionType::Transfer) => summary.total_transfer += txn.amount,
            Some(TransactionType::Commission) => summary.total_commission += txn.amount,
            None => {}
        }

        let category = summary.categories.entry(txn.category.clone()).or_default();
        match kind {
            Some(TransactionType::Income) => category.income += txn.amount,
            Some(TransactionType::Expense) => category.expense += txn.amount,
            _ => {}
        }
        category.count += 1;

        let method = txn
            .payment_method
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let method = summary.payment_methods.entry(method).or_default();
        method.total += txn.amount;
        method.count += 1;
    }

    summary.balance = summary.total_income - summary.total_expense;
    summary.transaction_count = transactions.len() as u64;
    summary
}

pub async fn accounting_summary<C: ConnectionTrait>(
    db: &C,
    filter: &TransactionFilter,
) -> Result<AccountingSummary> {
    let transactions = find_transactions(db, filter, 0, REPORT_SCAN_LIMIT).await?;
    Ok(summarize(&transactions))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// Grouping key of a timestamp; keys sort chronologically within a period kind
    pub fn key(self, at: DateTime<Utc>) -> String {
        match self {
            Period::Daily => at.format("%Y-%m-%d").to_string(),
            Period::Weekly => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Monthly => at.format("%Y-%m").to_string(),
            Period::Yearly => at.year().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub period: String,
    pub income: f64,
    pub expense: f64,
    pub transfer: f64,
    pub balance: f64,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period_type: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub data: Vec<PeriodRow>,
}

/// Group transactions by period, sorted by period key
pub fn group_by_period(transactions: &[transaction::Model], period: Period) -> Vec<PeriodRow> {
    let mut groups: BTreeMap<String, PeriodRow> = BTreeMap::new();

    for txn in transactions {
        let key = period.key(txn.created_at);
        let row = groups.entry(key.clone()).or_insert_with(|| PeriodRow {
            period: key,
            income: 0.0,
            expense: 0.0,
            transfer: 0.0,
            balance: 0.0,
            transaction_count: 0,
        });
        match TransactionType::parse(&txn.transaction_type) {
            Some(TransactionType::Income) => row.income += txn.amount,
            Some(TransactionType::Expense) => row.expense += txn.amount,
            Some(TransactionType::Transfer) => row.transfer += txn.amount,
            _ => {}
        }
        row.transaction_count += 1;
    }

    groups
        .into_values()
        .map(|mut row| {
            row.balance = row.income - row.expense;
            row
        })
        .collect()
}

/// Period report; the window defaults to the last 30 days
pub async fn period_report<C: ConnectionTrait>(
    db: &C,
    period: Period,
    mut filter: TransactionFilter,
) -> Result<PeriodReport> {
    let today = Utc::now().date_naive();
    let end_date = filter.end_date.unwrap_or(today);
    let start_date = filter.start_date.unwrap_or(end_date - Duration::days(30));
    filter.start_date = Some(start_date);
    filter.end_date = Some(end_date);

    let transactions = find_transactions(db, &filter, 0, REPORT_SCAN_LIMIT).await?;

    Ok(PeriodReport {
        period_type: period,
        start_date,
        end_date,
        data: group_by_period(&transactions, period),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfitSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    /// Net profit as a percentage of income
    pub profit_margin: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrdersSummary {
    pub total_orders: u64,
    pub total_order_amount: f64,
    pub paid_orders: u64,
    pub pending_orders: u64,
    /// Paid orders as a percentage of all orders
    pub payment_collection_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionCounts {
    pub total: u64,
    pub income_transactions: u64,
    pub expense_transactions: u64,
}

/// Profit, per-category breakdown and order collection over a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialDashboard {
    pub period: DashboardPeriod,
    pub financial_summary: ProfitSummary,
    pub income_breakdown: BTreeMap<String, f64>,
    pub expense_breakdown: BTreeMap<String, f64>,
    pub orders_summary: OrdersSummary,
    pub transaction_count: TransactionCounts,
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round2(part / whole * 100.0)
    } else {
        0.0
    }
}

pub fn build_financial_dashboard(
    period: DashboardPeriod,
    transactions: &[transaction::Model],
    orders: &[order::Model],
) -> FinancialDashboard {
    let mut dashboard = FinancialDashboard {
        period,
        ..Default::default()
    };
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for txn in transactions {
        match TransactionType::parse(&txn.transaction_type) {
            Some(TransactionType::Income) => {
                total_income += txn.amount;
                *dashboard
                    .income_breakdown
                    .entry(txn.category.clone())
                    .or_default() += txn.amount;
                dashboard.transaction_count.income_transactions += 1;
            }
            Some(TransactionType::Expense) => {
                total_expense += txn.amount;
                *dashboard
                    .expense_breakdown
                    .entry(txn.category.clone())
                    .or_default() += txn.amount;
                dashboard.transaction_count.expense_transactions += 1;
            }
            _ => {}
        }
    }
    dashboard.transaction_count.total = transactions.len() as u64;

    let net_profit = total_income - total_expense;
    dashboard.financial_summary = ProfitSummary {
        total_income: round2(total_income),
        total_expense: round2(total_expense),
        net_profit: round2(net_profit),
        profit_margin: percentage(net_profit, total_income),
    };

    let paid = PaymentStatus::Paid.to_string();
    let paid_orders = orders.iter().filter(|o| o.payment_status == paid).count() as u64;
    let total_orders = orders.len() as u64;
    dashboard.orders_summary = OrdersSummary {
        total_orders,
        total_order_amount: round2(orders.iter().fold(0.0, |acc, o| acc + o.total_amount)),
        paid_orders,
        pending_orders: total_orders - paid_orders,
        payment_collection_rate: percentage(paid_orders as f64, total_orders as f64),
    };

    dashboard
}

/// Financial dashboard for an optional business and creation-date window
pub async fn financial_dashboard<C: ConnectionTrait>(
    db: &C,
    filter: &TransactionFilter,
) -> Result<FinancialDashboard> {
    let transactions = find_transactions(db, filter, 0, REPORT_SCAN_LIMIT).await?;

    let mut orders = order::Entity::find();
    if let Some(business_id) = &filter.business_id {
        orders = orders.filter(order::Column::BusinessId.eq(business_id.as_str()));
    }
    if let Some(start) = filter.start_date {
        orders = orders.filter(order::Column::CreatedAt.gte(day_start(start)));
    }
    if let Some(end) = filter.end_date {
        orders = orders.filter(order::Column::CreatedAt.lt(day_start(end) + Duration::days(1)));
    }
    let orders = orders.limit(REPORT_SCAN_LIMIT).all(db).await?;

    Ok(build_financial_dashboard(
        DashboardPeriod {
            start_date: filter.start_date,
            end_date: filter.end_date,
        },
        &transactions,
        &orders,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn txn(kind: &str, category: &str, amount: f64, at: DateTime<Utc>) -> transaction::Model {
        transaction::Model {
            id: uuid::Uuid::new_v4().to_string(),
            transaction_code: generate_code("TXN"),
            business_id: "biz".to_string(),
            transaction_type: kind.to_string(),
            category: category.to_string(),
            description: String::new(),
            amount,
            payment_method: Some("cash".to_string()),
            reference_number: None,
            order_id: None,
            created_by: "user".to_string(),
            created_at: at,
        }
    }

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code("ORD");
        assert!(code.starts_with("ORD"));
        assert_eq!(code.len(), 3 + 14 + 6);
        assert!(code[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_summarize_totals() {
        let now = Utc::now();
        let transactions = vec![
            txn("income", CATEGORY_ORDER_PAYMENT, 150_000.0, now),
            txn("income", CATEGORY_ADMIN_FEE, 5_000.0, now),
            txn("expense", CATEGORY_BELANJA, 20_000.0, now),
            txn("transfer", "Mutasi", 50_000.0, now),
        ];

        let summary = summarize(&transactions);

        assert_eq!(summary.total_income, 155_000.0);
        assert_eq!(summary.total_expense, 20_000.0);
        assert_eq!(summary.total_transfer, 50_000.0);
        assert_eq!(summary.balance, 135_000.0);
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.categories[CATEGORY_BELANJA].expense, 20_000.0);
        assert_eq!(summary.payment_methods["cash"].count, 4);
    }

    #[test]
    fn test_period_keys() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        assert_eq!(Period::Daily.key(at), "2025-01-02");
        assert_eq!(Period::Weekly.key(at), "2025-W01");
        assert_eq!(Period::Monthly.key(at), "2025-01");
        assert_eq!(Period::Yearly.key(at), "2025");
    }

    #[test]
    fn test_group_by_period_sorted() {
        let d1 = Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let transactions = vec![
            txn("income", CATEGORY_ORDER_PAYMENT, 100.0, d1),
            txn("expense", CATEGORY_BELANJA, 40.0, d1),
            txn("income", CATEGORY_ORDER_PAYMENT, 10.0, d2),
        ];

        let rows = group_by_period(&transactions, Period::Daily);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2025-03-01");
        assert_eq!(rows[1].balance, 60.0);
        assert_eq!(rows[1].transaction_count, 2);
    }

    fn order_with(total: f64, paid: f64) -> order::Model {
        let now = Utc::now();
        order::Model {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: generate_code("ORD"),
            business_id: "biz".to_string(),
            customer_name: "Budi".to_string(),
            customer_phone: None,
            customer_email: None,
            service_type: "Pasang Baru".to_string(),
            order_details: "{}".to_string(),
            total_amount: total,
            paid_amount: paid,
            payment_method: None,
            status: "pending".to_string(),
            payment_status: PaymentStatus::from_amounts(total, paid).to_string(),
            assigned_to: None,
            requires_technician: false,
            notes: None,
            completion_date: None,
            created_by: "user".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_financial_dashboard_figures() {
        let now = Utc::now();
        let transactions = vec![
            txn("income", CATEGORY_ORDER_PAYMENT, 200_000.0, now),
            txn("income", CATEGORY_ADMIN_FEE, 50_000.0, now),
            txn("expense", CATEGORY_BELANJA, 50_000.0, now),
            txn("transfer", "Mutasi", 10_000.0, now),
        ];
        let orders = vec![
            order_with(100_000.0, 100_000.0),
            order_with(100_000.0, 40_000.0),
            order_with(50_000.0, 0.0),
            order_with(25_000.0, 30_000.0),
        ];

        let dashboard =
            build_financial_dashboard(DashboardPeriod::default(), &transactions, &orders);

        assert_eq!(dashboard.financial_summary.net_profit, 200_000.0);
        assert_eq!(dashboard.financial_summary.profit_margin, 80.0);
        assert_eq!(dashboard.income_breakdown[CATEGORY_ADMIN_FEE], 50_000.0);
        assert_eq!(dashboard.expense_breakdown[CATEGORY_BELANJA], 50_000.0);
        assert_eq!(dashboard.transaction_count.total, 4);
        assert_eq!(dashboard.transaction_count.income_transactions, 2);
        assert_eq!(dashboard.transaction_count.expense_transactions, 1);
        assert_eq!(dashboard.orders_summary.total_order_amount, 275_000.0);
        assert_eq!(dashboard.orders_summary.paid_orders, 2);
        assert_eq!(dashboard.orders_summary.pending_orders, 2);
        assert_eq!(dashboard.orders_summary.payment_collection_rate, 50.0);
    }

    #[test]
    fn test_empty_financial_dashboard() {
        let dashboard = build_financial_dashboard(DashboardPeriod::default(), &[], &[]);

        assert_eq!(dashboard.financial_summary.profit_margin, 0.0);
        assert!(dashboard.financial_summary.total_income.is_sign_positive());
        assert_eq!(dashboard.orders_summary.payment_collection_rate, 0.0);
    }
}
