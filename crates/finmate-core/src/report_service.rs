//! Read-only aggregates over the ledger: totals, month reports, and exports.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use finmate_domain::{days_in_month, Amounted, DateWindow, EntryKind, Ledger, LedgerEntry};

use crate::{
    period::{elapsed_fraction, project_to_period_end},
    CoreError, CoreResult,
};

const UNCATEGORIZED: &str = "Uncategorized";
const TOP_MERCHANTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub balance: Decimal,
}

/// Month-to-date totals with a linear month-end expense projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectedMonthEnd {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub elapsed_fraction: f64,
    pub expenses_to_date: Decimal,
    pub income_to_date: Decimal,
    pub projected_expenses: Decimal,
    pub projected_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantTotal {
    pub merchant: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthReport {
    pub year: i32,
    pub month: u32,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub categories: Vec<CategoryTotal>,
    pub top_merchants: Vec<MerchantTotal>,
    pub daily_trend: Vec<DailyTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(CoreError::InvalidArgument(format!(
                "unsupported export format `{other}`, expected csv or html"
            ))),
        }
    }
}

/// A rendered export ready to hand to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub struct ReportService;

impl ReportService {
    pub fn summary(ledger: &Ledger) -> Summary {
        let total_expense = total(&ledger.expenses);
        let total_income = total(&ledger.income);
        Summary {
            total_expense,
            total_income,
            balance: total_income - total_expense,
        }
    }

    pub fn projected_eom(ledger: &Ledger, now: DateTime<Utc>) -> CoreResult<ProjectedMonthEnd> {
        let today = now.date_naive();
        let window = month_window(today.year(), today.month())?;
        let expenses_to_date = total_in(&ledger.expenses, &window);
        let income_to_date = total_in(&ledger.income, &window);
        let fraction = elapsed_fraction(&window, now);
        let projected_expenses = project_to_period_end(expenses_to_date, &window, now).round_dp(2);
        debug!(
            %expenses_to_date,
            fraction,
            %projected_expenses,
            "projected month-end spending"
        );
        Ok(ProjectedMonthEnd {
            month_start: window.start,
            month_end: window.end.pred_opt().unwrap_or(window.start),
            elapsed_fraction: fraction,
            expenses_to_date,
            income_to_date,
            projected_expenses,
            projected_balance: income_to_date - projected_expenses,
        })
    }

    pub fn month(ledger: &Ledger, year: i32, month: u32) -> CoreResult<MonthReport> {
        let window = month_window(year, month)?;
        let expenses: Vec<&LedgerEntry> = ledger
            .expenses
            .iter()
            .filter(|entry| window.contains(entry.date))
            .collect();

        let mut by_category: HashMap<String, Decimal> = HashMap::new();
        let mut by_merchant: HashMap<String, Decimal> = HashMap::new();
        let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
        for entry in &expenses {
            *by_category.entry(category_name(ledger, entry)).or_default() += entry.amount;
            if let Some(merchant) = entry.counterparty.as_deref() {
                *by_merchant.entry(merchant.to_string()).or_default() += entry.amount;
            }
            *by_day.entry(entry.date).or_default() += entry.amount;
        }

        let mut categories: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect();
        categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

        let mut top_merchants: Vec<MerchantTotal> = by_merchant
            .into_iter()
            .map(|(merchant, total)| MerchantTotal { merchant, total })
            .collect();
        top_merchants.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.merchant.cmp(&b.merchant)));
        top_merchants.truncate(TOP_MERCHANTS);

        let daily_trend = window
            .start
            .iter_days()
            .take_while(|date| *date < window.end)
            .map(|date| DailyTotal {
                date,
                total: by_day.get(&date).copied().unwrap_or_default(),
            })
            .collect();

        Ok(MonthReport {
            year,
            month,
            total_expense: expenses.iter().map(|entry| entry.amount).sum(),
            total_income: total_in(&ledger.income, &window),
            categories,
            top_merchants,
            daily_trend,
        })
    }

    /// Renders the month's expense and income rows.
    ///
    /// `currency_symbol` only affects the HTML rendering.
    pub fn export(
        ledger: &Ledger,
        year: i32,
        month: u32,
        format: ExportFormat,
        currency_symbol: &str,
    ) -> CoreResult<ExportFile> {
        let window = month_window(year, month)?;
        let mut rows: Vec<&LedgerEntry> = ledger
            .all_entries()
            .filter(|entry| window.contains(entry.date))
            .collect();
        rows.sort_by_key(|entry| (entry.date, entry.created_at));

        let body = match format {
            ExportFormat::Csv => render_csv(ledger, &rows)?,
            ExportFormat::Html => render_html(ledger, &rows, year, month, currency_symbol),
        };
        Ok(ExportFile {
            filename: format!("finmate_{year:04}_{month:02}.{}", format.extension()),
            content_type: format.content_type(),
            body,
        })
    }
}

fn month_window(year: i32, month: u32) -> CoreResult<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::InvalidArgument(format!("invalid month {year}-{month:02}")))?;
    let end = start
        .checked_add_days(Days::new(u64::from(days_in_month(year, month))))
        .ok_or_else(|| CoreError::InvalidArgument(format!("month {year}-{month:02} has no end date")))?;
    Ok(DateWindow::new(start, end)?)
}

fn total<T: Amounted>(items: &[T]) -> Decimal {
    items.iter().map(Amounted::amount).sum()
}

fn total_in(entries: &[LedgerEntry], window: &DateWindow) -> Decimal {
    entries
        .iter()
        .filter(|entry| window.contains(entry.date))
        .map(Amounted::amount)
        .sum()
}

fn category_name(ledger: &Ledger, entry: &LedgerEntry) -> String {
    entry
        .category_id
        .and_then(|id| ledger.category(id))
        .map(|category| category.name.clone())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

fn render_csv(ledger: &Ledger, rows: &[&LedgerEntry]) -> CoreResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["type", "date", "amount", "category", "counterparty", "notes"])?;
    for entry in rows {
        writer.write_record([
            entry.kind.to_string(),
            entry.date.to_string(),
            format!("{:.2}", entry.amount),
            category_name(ledger, entry),
            entry.counterparty.clone().unwrap_or_default(),
            entry.notes.clone().unwrap_or_default(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| CoreError::Serde(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| CoreError::Serde(err.to_string()))
}

fn render_html(
    ledger: &Ledger,
    rows: &[&LedgerEntry],
    year: i32,
    month: u32,
    currency_symbol: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(
        out,
        "<html><head><meta charset=\"utf-8\"><title>finmate {year:04}-{month:02}</title></head><body>"
    );
    let _ = writeln!(out, "<h1>Transactions {year:04}-{month:02}</h1>");
    let _ = writeln!(
        out,
        "<table><thead><tr><th>Type</th><th>Date</th><th>Amount</th><th>Category</th><th>Counterparty</th><th>Notes</th></tr></thead><tbody>"
    );
    for entry in rows {
        let _ = writeln!(
            out,
            "<tr class=\"{kind}\"><td>{kind}</td><td>{date}</td><td>{amount}</td><td>{category}</td><td>{party}</td><td>{notes}</td></tr>",
            kind = entry.kind,
            date = entry.date,
            amount = escape_html(&format!("{currency_symbol}{:.2}", entry.amount)),
            category = escape_html(&category_name(ledger, entry)),
            party = escape_html(entry.counterparty.as_deref().unwrap_or("")),
            notes = escape_html(entry.notes.as_deref().unwrap_or("")),
        );
    }
    let expenses: Decimal = rows
        .iter()
        .filter(|entry| entry.kind == EntryKind::Expense)
        .map(|entry| entry.amount)
        .sum();
    let income: Decimal = rows
        .iter()
        .filter(|entry| entry.kind == EntryKind::Income)
        .map(|entry| entry.amount)
        .sum();
    let _ = writeln!(out, "</tbody></table>");
    let _ = writeln!(
        out,
        "<p>Total expenses: {}</p><p>Total income: {}</p>",
        escape_html(&format!("{currency_symbol}{expenses:.2}")),
        escape_html(&format!("{currency_symbol}{income:.2}")),
    );
    let _ = writeln!(out, "</body></html>");
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
