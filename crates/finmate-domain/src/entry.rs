//! Domain models for recorded expenses and income.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::{category::CategoryKind, common::*};

/// Distinguishes money leaving (expense) from money arriving (income).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Expense,
    Income,
}

impl EntryKind {
    /// Category kind an entry of this kind may reference.
    pub fn category_kind(self) -> CategoryKind {
        match self {
            EntryKind::Expense => CategoryKind::Expense,
            EntryKind::Income => CategoryKind::Income,
        }
    }

    /// Wire name of the counterparty field for this kind.
    pub fn counterparty_field(self) -> &'static str {
        match self {
            EntryKind::Expense => "merchant",
            EntryKind::Income => "source",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        };
        f.write_str(label)
    }
}

/// A single expense or income record.
///
/// Serializes the counterparty as `merchant` for expenses and `source` for
/// income; either key (or `counterparty`) is accepted when reading.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Merchant for expenses, source for income.
    #[serde(default, alias = "merchant", alias = "source")]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(kind: EntryKind, amount: Decimal, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            date,
            category_id: None,
            counterparty: None,
            notes: None,
            created_at,
        }
    }

    /// Expense stamped as created at the start of its own date.
    pub fn expense(amount: Decimal, date: NaiveDate) -> Self {
        Self::new(EntryKind::Expense, amount, date, start_of(date))
    }

    /// Income stamped as created at the start of its own date.
    pub fn income(amount: Decimal, date: NaiveDate) -> Self {
        Self::new(EntryKind::Income, amount, date, start_of(date))
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

impl Serialize for LedgerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.notes.is_some() { 8 } else { 7 };
        let mut state = serializer.serialize_struct("LedgerEntry", field_count)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("category_id", &self.category_id)?;
        state.serialize_field(self.kind.counterparty_field(), &self.counterparty)?;
        match &self.notes {
            Some(notes) => state.serialize_field("notes", notes)?,
            None => state.skip_field("notes")?,
        }
        state.serialize_field("created_at", &self.created_at)?;
        state.end()
    }
}

impl BelongsToCategory for LedgerEntry {
    fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }
}

impl Amounted for LedgerEntry {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Fields a caller supplies when creating or replacing an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryDraft {
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default, alias = "merchant", alias = "source")]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters accepted when listing entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryFilter {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring matched against the counterparty.
    #[serde(default, alias = "merchant", alias = "source")]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl EntryFilter {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if self.start_date.map_or(false, |start| entry.date < start) {
            return false;
        }
        if self.end_date.map_or(false, |end| entry.date > end) {
            return false;
        }
        if self.category_id.is_some() && entry.category_id != self.category_id {
            return false;
        }
        match self.counterparty.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => entry
                .counterparty
                .as_deref()
                .map(|party| party.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            _ => true,
        }
    }
}
