use crate::{
    category::{Category, FALLBACK_CATEGORY_ALIAS},
    shared::entity::{Entity, ID},
};
use chrono::prelude::*;
use thiserror::Error;

/// Amounts are stored as whole kopecks
pub type Kopecks = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ID,
    pub user_id: ID,
    pub category_id: ID,
    pub amount: Kopecks,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
}

impl Entity for Expense {
    fn id(&self) -> ID {
        self.id
    }
}

/// An expense joined with the name of its category
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseWithCategory {
    pub expense: Expense,
    pub category_name: String,
}

/// Sum of a user's expenses in one category over a period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseStatistic {
    pub category_name: String,
    pub amount: Kopecks,
}

/// Orders statistics by amount, largest first. Equal amounts are ordered by name
/// so the output is stable.
pub fn sort_statistics(stats: &mut [ExpenseStatistic]) {
    stats.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExpenseParseError {
    #[error("Amount is missing")]
    MissingAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Parses `500`, `500.5` or `500,50` into kopecks. The sign is ignored.
pub fn parse_amount(input: &str) -> Result<Kopecks, ExpenseParseError> {
    let invalid = || ExpenseParseError::InvalidAmount(input.to_string());
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed).replace(',', ".");
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned.as_str(), ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) || fraction.len() > 2 {
        return Err(invalid());
    }

    let rubles: i64 = whole.parse().map_err(|_| invalid())?;
    let kopecks: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    let amount = rubles
        .checked_mul(100)
        .and_then(|r| r.checked_add(kopecks))
        .ok_or_else(invalid)?;
    if amount == 0 {
        return Err(invalid());
    }
    Ok(amount)
}

pub fn format_amount(amount: Kopecks) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    if abs % 100 == 0 {
        format!("{}{}", sign, abs / 100)
    } else {
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Chat input of the form `<amount> <category alias> [description...]`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseMessage {
    pub amount: Kopecks,
    pub category_alias: String,
    pub description: Option<String>,
}

impl ExpenseMessage {
    /// Splits the input into amount, category alias and description.
    ///
    /// Aliases may consist of several words, the longest alias of `categories`
    /// that prefixes the remaining words wins. When none matches the first word
    /// is taken as the alias and resolves to the fallback category later.
    pub fn parse(input: &str, categories: &[Category]) -> Result<Self, ExpenseParseError> {
        let mut words = input.split_whitespace();
        let amount = parse_amount(words.next().ok_or(ExpenseParseError::MissingAmount)?)?;
        let rest: Vec<&str> = words.collect();
        if rest.is_empty() {
            return Ok(Self {
                amount,
                category_alias: FALLBACK_CATEGORY_ALIAS.to_string(),
                description: None,
            });
        }

        let lowered: Vec<String> = rest.iter().map(|w| w.to_lowercase()).collect();
        let alias_len = categories
            .iter()
            .flat_map(|c| c.aliases.iter())
            .filter_map(|alias| {
                let alias_words: Vec<&str> = alias.split_whitespace().collect();
                let matches = !alias_words.is_empty()
                    && alias_words.len() <= lowered.len()
                    && alias_words.iter().zip(lowered.iter()).all(|(a, w)| a == w);
                matches.then_some(alias_words.len())
            })
            .max()
            .unwrap_or(1);

        let description = rest[alias_len..].join(" ");
        Ok(Self {
            amount,
            category_alias: lowered[..alias_len].join(" "),
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
        })
    }
}
