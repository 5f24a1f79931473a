use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

/// Category of a financial collection
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
    Tithe,
    Offering,
    Donation,
    Pledge,
    Thanksgiving,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Collection {
    pub id: Uuid,
    pub entity_id: Option<Uuid>,
    pub member_id: Option<Uuid>, // None for anonymous/plate collections
    pub kind: CollectionKind,
    pub amount_cents: i64,
    pub currency: String,
    pub collected_on: NaiveDate,
    pub notes: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for recording or correcting a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct CreateCollection {
    pub entity_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub kind: CollectionKind,
    pub amount_cents: i64,
    pub currency: String,
    pub collected_on: NaiveDate,
    pub notes: Option<String>,
}

/// Query string for collection listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CollectionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CollectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

/// Totals over a set of collections, in minor units
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
pub struct CollectionSummary {
    pub count: usize,
    pub total_cents: i64,
    pub by_kind: BTreeMap<CollectionKind, i64>,
}

impl CollectionSummary {
    pub fn from_collections<'a>(collections: impl IntoIterator<Item = &'a Collection>) -> Self {
        collections
            .into_iter()
            .fold(Self::default(), |mut summary, collection| {
                summary.count += 1;
                summary.total_cents = summary.total_cents.saturating_add(collection.amount_cents);
                let entry = summary.by_kind.entry(collection.kind).or_insert(0);
                *entry = entry.saturating_add(collection.amount_cents);
                summary
            })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be empty")]
    Empty,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount is too large")]
    Overflow,
}

/// Parse a decimal amount such as "1,250.5" into minor units (125050)
pub fn parse_amount(input: &str) -> Result<i64, AmountError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::Invalid(input.trim().to_string()));
    }
    if fraction.len() > 2 {
        return Err(AmountError::TooPrecise(input.trim().to_string()));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let fraction_units: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| AmountError::Invalid(input.to_string()))? * 10,
        _ => fraction.parse().map_err(|_| AmountError::Invalid(input.to_string()))?,
    };

    let cents = whole_units
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or(AmountError::Overflow)?;
    if cents == 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(cents)
}

/// Render minor units as a two-decimal string
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12"), Ok(1200));
        assert_eq!(parse_amount("12.5"), Ok(1250));
        assert_eq!(parse_amount(" 1,250.05 "), Ok(125005));
        assert_eq!(parse_amount(".75"), Ok(75));
        assert_eq!(parse_amount("3."), Ok(300));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("."), Err(AmountError::Invalid(".".into())));
        assert_eq!(parse_amount("-5"), Err(AmountError::Invalid("-5".into())));
        assert_eq!(parse_amount("ten"), Err(AmountError::Invalid("ten".into())));
        assert_eq!(parse_amount("1.234"), Err(AmountError::TooPrecise("1.234".into())));
        assert_eq!(parse_amount("0.00"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("99999999999999999999"), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(125005), "1250.05");
        assert_eq!(format_amount(7), "0.07");
        assert_eq!(format_amount(-1250), "-12.50");
    }

    #[test]
    fn test_summary_groups_by_kind() {
        let make = |kind, amount_cents| Collection {
            id: Uuid::new_v4(),
            entity_id: None,
            member_id: None,
            kind,
            amount_cents,
            currency: "USD".into(),
            collected_on: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            notes: None,
            recorded_by: None,
            created_at: Utc::now(),
        };
        let collections = vec![
            make(CollectionKind::Tithe, 10_000),
            make(CollectionKind::Offering, 2_550),
            make(CollectionKind::Tithe, 5_000),
        ];

        let summary = CollectionSummary::from_collections(&collections);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_cents, 17_550);
        assert_eq!(summary.by_kind.get(&CollectionKind::Tithe), Some(&15_000));
        assert_eq!(summary.by_kind.get(&CollectionKind::Offering), Some(&2_550));
        assert_eq!(summary.by_kind.get(&CollectionKind::Pledge), None);
    }

    #[test]
    fn test_kind_parses_from_cli_text() {
        assert_eq!("tithe".parse::<CollectionKind>(), Ok(CollectionKind::Tithe));
        assert_eq!(CollectionKind::Thanksgiving.to_string(), "thanksgiving");
    }
}
