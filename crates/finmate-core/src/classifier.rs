//! Merchant classification: category prediction from learned feedback and
//! keyword rules, plus recurring-charge detection over expense history.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use finmate_domain::{Ledger, MerchantFeedback, RecurringSeries};

use crate::{money::non_negative_amount, CategoryService, CoreError, CoreResult};

const EXACT_FEEDBACK_CONFIDENCE: f64 = 0.98;
const FUZZY_FEEDBACK_THRESHOLD: f64 = 0.9;
const FALLBACK_CATEGORY: &str = "Shopping";
const FALLBACK_CONFIDENCE: f64 = 0.4;

const MIN_OCCURRENCES: usize = 3;
const AMOUNT_TOLERANCE: Decimal = dec!(0.10);
const MIN_INTERVAL_SLACK_DAYS: f64 = 3.0;
const INTERVAL_SLACK_SHARE: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Merchant,
    Notes,
}

struct KeywordRule {
    field: Field,
    keywords: &'static [&'static str],
    category: &'static str,
    confidence: f64,
    explanation: &'static str,
}

/// Evaluated top to bottom; the first match wins.
static KEYWORD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule {
            field: Field::Merchant,
            keywords: &["uber", "lyft", "taxi"],
            category: "Transport",
            confidence: 0.95,
            explanation: "Matched transport keywords in merchant",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["starbucks", "coffee"],
            category: "Food & Drink",
            confidence: 0.9,
            explanation: "Matched coffee/restaurant keywords",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["amazon", "shop", "store"],
            category: "Shopping",
            confidence: 0.85,
            explanation: "Matched shopping keywords",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["netflix", "spotify", "movie"],
            category: "Entertainment",
            confidence: 0.9,
            explanation: "Matched streaming/entertainment keywords",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["rent"],
            category: "Rent",
            confidence: 0.95,
            explanation: "Matched rent keyword",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["electric", "water"],
            category: "Utilities",
            confidence: 0.9,
            explanation: "Matched utilities keywords",
        },
        KeywordRule {
            field: Field::Merchant,
            keywords: &["salary", "paycheck"],
            category: "Salary",
            confidence: 0.95,
            explanation: "Matched salary/paycheck keyword",
        },
        KeywordRule {
            field: Field::Notes,
            keywords: &["grocery", "supermarket"],
            category: "Groceries",
            confidence: 0.75,
            explanation: "Matched grocery in notes",
        },
    ]
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub merchant: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub category: Option<String>,
    /// Set when the predicted name matches a category in the ledger.
    pub category_id: Option<Uuid>,
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfirmation {
    pub merchant: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRequest {
    pub merchant: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringVerdict {
    pub is_recurring: bool,
    pub confidence: f64,
    pub avg_interval_days: Option<f64>,
    pub occurrences: usize,
}

/// Lowercases and collapses whitespace so merchant spellings compare equal.
pub fn normalize_merchant(merchant: &str) -> String {
    merchant
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub struct Classifier;

impl Classifier {
    pub fn predict_category(ledger: &Ledger, request: &PredictionRequest) -> Prediction {
        let merchant = normalize_merchant(&request.merchant);
        let notes = request.notes.as_deref().unwrap_or("").to_lowercase();

        let (category, confidence, explanation) = Self::from_feedback(ledger, &merchant)
            .or_else(|| Self::from_rules(&merchant, &notes))
            .unwrap_or_else(|| {
                if merchant.is_empty() {
                    (None, 0.0, "No prediction".to_string())
                } else {
                    (
                        Some(FALLBACK_CATEGORY.to_string()),
                        FALLBACK_CONFIDENCE,
                        "Generic fallback based on merchant tokens".to_string(),
                    )
                }
            });

        let category_id = category
            .as_deref()
            .and_then(|name| CategoryService::find_by_name(ledger, name))
            .map(|category| category.id);
        debug!(%merchant, ?category, confidence, "predicted category");
        Prediction {
            category,
            category_id,
            confidence,
            explanation,
        }
    }

    /// Records the user's choice so later predictions for the merchant follow it.
    pub fn confirm_category(
        ledger: &mut Ledger,
        confirmation: CategoryConfirmation,
        now: DateTime<Utc>,
    ) -> CoreResult<MerchantFeedback> {
        let merchant = normalize_merchant(&confirmation.merchant);
        let category = confirmation.category.trim().to_string();
        if merchant.is_empty() || category.is_empty() {
            return Err(CoreError::InvalidArgument(
                "merchant and category are required".into(),
            ));
        }
        let feedback = MerchantFeedback {
            merchant: merchant.clone(),
            category,
            confirmed_at: now,
        };
        match ledger
            .merchant_feedback
            .iter_mut()
            .find(|existing| existing.merchant == merchant)
        {
            Some(existing) => *existing = feedback.clone(),
            None => ledger.merchant_feedback.push(feedback.clone()),
        }
        ledger.touch();
        info!(merchant = %feedback.merchant, category = %feedback.category, "category confirmed");
        Ok(feedback)
    }

    /// Decides whether charges from a merchant at roughly this amount recur on a schedule.
    pub fn recurring_check(ledger: &Ledger, request: &RecurringRequest) -> RecurringVerdict {
        let merchant = normalize_merchant(&request.merchant);
        let (occurrences, intervals) = Self::history(ledger, &merchant, request.amount);
        let mean = mean(&intervals);

        if let Some(series) = ledger
            .recurring_series
            .iter()
            .find(|series| series.merchant == merchant)
        {
            return RecurringVerdict {
                is_recurring: true,
                confidence: 1.0,
                avg_interval_days: series.interval_days.or(mean),
                occurrences,
            };
        }

        let verdict = match mean {
            Some(mean) if occurrences >= MIN_OCCURRENCES && mean > 0.0 => {
                let slack = MIN_INTERVAL_SLACK_DAYS.max(INTERVAL_SLACK_SHARE * mean);
                let spread = intervals
                    .iter()
                    .map(|interval| (interval - mean).abs())
                    .fold(0.0, f64::max);
                if spread <= slack {
                    let base = (0.6 + 0.1 * (occurrences - MIN_OCCURRENCES) as f64).min(0.95);
                    RecurringVerdict {
                        is_recurring: true,
                        confidence: base * (1.0 - 0.5 * spread / slack),
                        avg_interval_days: Some(mean),
                        occurrences,
                    }
                } else {
                    RecurringVerdict {
                        is_recurring: false,
                        confidence: 0.0,
                        avg_interval_days: Some(mean),
                        occurrences,
                    }
                }
            }
            _ => RecurringVerdict {
                is_recurring: false,
                confidence: 0.0,
                avg_interval_days: mean,
                occurrences,
            },
        };
        debug!(
            %merchant,
            occurrences,
            is_recurring = verdict.is_recurring,
            "checked recurring charge"
        );
        verdict
    }

    /// Marks a merchant as a known recurring charge.
    pub fn recurring_confirm(
        ledger: &mut Ledger,
        request: &RecurringRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<RecurringSeries> {
        let merchant = normalize_merchant(&request.merchant);
        if merchant.is_empty() {
            return Err(CoreError::InvalidArgument("merchant is required".into()));
        }
        let amount = non_negative_amount("recurring amount", request.amount)?;
        let (_, intervals) = Self::history(ledger, &merchant, amount);
        let series = RecurringSeries {
            merchant: merchant.clone(),
            amount,
            interval_days: mean(&intervals),
            confirmed_at: now,
        };
        ledger.recurring_series.retain(|existing| existing.merchant != merchant);
        ledger.recurring_series.push(series.clone());
        ledger.touch();
        info!(%merchant, amount = %series.amount, "recurring charge confirmed");
        Ok(series)
    }

    fn from_feedback(ledger: &Ledger, merchant: &str) -> Option<(Option<String>, f64, String)> {
        if merchant.is_empty() {
            return None;
        }
        if let Some(exact) = ledger
            .merchant_feedback
            .iter()
            .find(|feedback| feedback.merchant == merchant)
        {
            return Some((
                Some(exact.category.clone()),
                EXACT_FEEDBACK_CONFIDENCE,
                "Matched a merchant you categorized before".to_string(),
            ));
        }
        ledger
            .merchant_feedback
            .iter()
            .map(|feedback| (feedback, strsim::jaro_winkler(&feedback.merchant, merchant)))
            .filter(|(_, similarity)| *similarity >= FUZZY_FEEDBACK_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(feedback, similarity)| {
                (
                    Some(feedback.category.clone()),
                    EXACT_FEEDBACK_CONFIDENCE * similarity,
                    format!("Similar to previously categorized merchant `{}`", feedback.merchant),
                )
            })
    }

    fn from_rules(merchant: &str, notes: &str) -> Option<(Option<String>, f64, String)> {
        KEYWORD_RULES
            .iter()
            .find(|rule| {
                let haystack = match rule.field {
                    Field::Merchant => merchant,
                    Field::Notes => notes,
                };
                rule.keywords.iter().any(|keyword| haystack.contains(keyword))
            })
            .map(|rule| {
                (
                    Some(rule.category.to_string()),
                    rule.confidence,
                    rule.explanation.to_string(),
                )
            })
    }

    /// Matching expense count and the day gaps between consecutive matches.
    fn history(ledger: &Ledger, merchant: &str, amount: Decimal) -> (usize, Vec<f64>) {
        let tolerance = AMOUNT_TOLERANCE * amount.abs();
        let mut dates: Vec<_> = ledger
            .expenses
            .iter()
            .filter(|entry| {
                entry
                    .counterparty
                    .as_deref()
                    .map_or(false, |party| normalize_merchant(party) == merchant)
            })
            .filter(|entry| {
                entry
                    .amount
                    .checked_sub(amount)
                    .map_or(false, |diff| diff.abs() <= tolerance)
            })
            .map(|entry| entry.date)
            .collect();
        dates.sort();
        let intervals = dates
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days() as f64)
            .collect();
        (dates.len(), intervals)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
