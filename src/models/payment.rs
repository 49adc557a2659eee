use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A payment made to a labor. Unlike attendance, several payments may exist
/// for the same labor and date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub workplace_id: String,
    pub labor_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Daily,
    Weekly,
    Monthly,
    Partial,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::Daily => "daily",
            PaymentType::Weekly => "weekly",
            PaymentType::Monthly => "monthly",
            PaymentType::Partial => "partial",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("invalid payment type: {0}")]
pub struct ParsePaymentTypeError(String);

impl FromStr for PaymentType {
    type Err = ParsePaymentTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "daily" => Ok(PaymentType::Daily),
            "weekly" => Ok(PaymentType::Weekly),
            "monthly" => Ok(PaymentType::Monthly),
            "partial" => Ok(PaymentType::Partial),
            other => Err(ParsePaymentTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreateInput {
    pub labor_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdateInput {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, rename = "type")]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub notes: Option<Option<String>>,
}
