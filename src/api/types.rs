use serde::Deserialize;
use std::fmt;

use crate::invoice::Invoice;

/// Body of `GET /status`
#[derive(Debug, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub port: Option<u16>,
}

/// One-line backend health, as shown at the top of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Ok(Option<u16>),
    /// The backend answered but reported a problem
    Error,
    /// Nothing usable came back
    Disconnected,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Ok(Some(port)) => write!(f, "OK ({port})"),
            StatusLine::Ok(None) => f.write_str("OK"),
            StatusLine::Error => f.write_str("Error"),
            StatusLine::Disconnected => f.write_str("Sin conexión"),
        }
    }
}

/// Body of `POST /ia/resumen-cobro`
#[derive(Debug, Deserialize)]
pub(crate) struct AiResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub respuesta: Option<String>,
}

/// Body of `POST /facturas/csv`
#[derive(Debug, Deserialize)]
pub(crate) struct CsvImport {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub insertadas: usize,
}

/// Body of `GET /reporte/mensual`
#[derive(Debug, Deserialize)]
pub struct MonthlyReport {
    #[serde(rename = "resumen")]
    pub summary: MonthlySummary,
    #[serde(rename = "facturas", default)]
    pub invoices: Vec<Invoice>,
}

/// Figures computed by the backend for one calendar month
#[derive(Debug, Deserialize)]
pub struct MonthlySummary {
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "total_facturas", default)]
    pub count: usize,
    #[serde(rename = "monto_total", default)]
    pub total: f64,
    #[serde(rename = "pendientes", default)]
    pub pending: usize,
    #[serde(rename = "vencidas", default)]
    pub overdue: usize,
    #[serde(rename = "por_vencer", default)]
    pub due_soon: usize,
}
