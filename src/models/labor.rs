use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A worker. `daily_wage` is the base rate that attendance wages are
/// snapshotted from at mark time.
///
/// `workplace_id` defaults to empty on deserialization so that backup
/// documents written before workplaces existed still parse; the import path
/// assigns those records to a default workplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Labor {
    pub id: String,
    #[serde(default)]
    pub workplace_id: String,
    pub name: String,
    pub phone: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_wage: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaborCreateInput {
    pub name: String,
    pub phone: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_wage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaborUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub daily_wage: Option<Decimal>,
}
