use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{CobrosError, Result};

/// Payment state of an invoice. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Status {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "pagada")]
    Paid,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pendiente",
            Status::Paid => "pagada",
        }
    }

    /// Anything other than a recognizable "pagada" is still owed.
    fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "pagada" => Status::Paid,
            _ => Status::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An invoice as listed by the backend.
///
/// Decoding never rejects a record because of a bad amount, date or status:
/// amounts fall back to zero, dates to `None` and statuses to pending.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invoice {
    /// Empty when the backend omits it; such rows cannot be marked paid
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(rename = "cliente", default, deserialize_with = "de_text")]
    pub client: String,
    #[serde(rename = "monto", default, deserialize_with = "de_amount")]
    pub amount: f64,
    #[serde(rename = "vence", default, deserialize_with = "de_due")]
    pub due: Option<NaiveDate>,
    #[serde(rename = "estado", default, deserialize_with = "de_status")]
    pub status: Status,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == Status::Paid
    }
}

/// Body of `POST /facturas`. The backend assigns the id and the initial status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInvoice {
    #[serde(rename = "cliente")]
    pub client: String,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "vence")]
    pub due: NaiveDate,
}

impl NewInvoice {
    /// Validate raw user input the same way the backend does before insert
    pub fn parse(client: &str, amount: &str, due: &str) -> Result<Self> {
        let client = client.trim();
        if client.is_empty() {
            return Err(CobrosError::MissingClient);
        }

        let parsed: f64 = amount
            .trim()
            .parse()
            .map_err(|_| CobrosError::InvalidAmount(amount.to_string()))?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(CobrosError::InvalidAmount(amount.to_string()));
        }

        let due = parse_input_date(due)?;

        Ok(Self {
            client: client.to_string(),
            amount: parsed,
            due,
        })
    }
}

/// Body of `PUT /facturas/{id}`
#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub estado: Status,
}

/// Parse a date typed by a user: `aaaa-mm-dd` or `dd/mm/aaaa`
pub fn parse_input_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    let format = if s.contains('/') { "%d/%m/%Y" } else { "%Y-%m-%d" };
    NaiveDate::parse_from_str(s, format).map_err(|_| CobrosError::InvalidDate(raw.to_string()))
}

/// Parse a due date coming from the backend. Timestamps keep their date part.
fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(date) = parse_input_date(s) {
        return Some(date);
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// Strings pass through; numeric ids and other scalars keep their JSON text
fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

fn de_amount<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(coerce_amount(&Value::deserialize(deserializer)?))
}

fn de_due<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => parse_wire_date(&s),
        _ => None,
    })
}

fn de_status<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Status, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Status::from_wire(Some(&s)),
        _ => Status::from_wire(None),
    })
}
