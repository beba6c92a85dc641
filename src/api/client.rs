use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::http::Response;
use ureq::{Agent, Body};

use super::types::{AiResponse, CsvImport, MonthlyReport, ServiceStatus, StatusLine};
use crate::error::{CobrosError, Result};
use crate::invoice::{Invoice, NewInvoice, Status, StatusUpdate};

/// Blocking client for the invoice backend.
///
/// The base address is fixed at construction; every request is built from it.
/// Requests are never retried.
pub struct ApiClient {
    base: String,
    agent: Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            base: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// `GET /status`. Failures are folded into the returned line.
    pub fn ping(&self) -> StatusLine {
        let url = self.url("/status");
        let result = self
            .get(&url, &[])
            .and_then(|body| decode::<ServiceStatus>(&url, &body));

        match result {
            Ok(status) if status.ok => StatusLine::Ok(status.port),
            Ok(_) => StatusLine::Error,
            Err(CobrosError::Backend { status, .. }) => {
                warn!(status, "backend reported an error on /status");
                StatusLine::Error
            }
            Err(e) => {
                warn!(error = %e, "status check failed");
                StatusLine::Disconnected
            }
        }
    }

    /// `GET /facturas`, optionally filtered by client name
    pub fn list_invoices(&self, query: Option<&str>) -> Result<Vec<Invoice>> {
        let url = self.url("/facturas");
        let query: Vec<(&str, &str)> = match query.map(str::trim) {
            Some(q) if !q.is_empty() => vec![("q", q)],
            _ => Vec::new(),
        };

        let body = self.get(&url, &query)?;
        let invoices: Vec<Invoice> = decode(&url, &body)?;
        debug!(count = invoices.len(), "listed invoices");
        Ok(invoices)
    }

    /// `POST /facturas`. The response body is not used.
    pub fn create_invoice(&self, invoice: &NewInvoice) -> Result<()> {
        let url = self.url("/facturas");
        self.post_json(&url, invoice)?;
        debug!(client = %invoice.client, "created invoice");
        Ok(())
    }

    /// `PUT /facturas/{id}` with `{"estado": "pagada"}`. The response body is not used.
    pub fn set_paid(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/facturas/{id}"));
        self.put_json(&url, &StatusUpdate { estado: Status::Paid })?;
        debug!(id, "marked invoice paid");
        Ok(())
    }

    /// `POST /ia/resumen-cobro`.
    ///
    /// Any failure, including a well-formed `ok: false`, surfaces as
    /// [`CobrosError::AiSummary`]; the cause is only logged.
    pub fn ai_summary(&self, text: &str) -> Result<String> {
        let url = self.url("/ia/resumen-cobro");
        let result = self
            .post_json(&url, &json!({ "texto": text }))
            .and_then(|body| decode::<AiResponse>(&url, &body));

        match result {
            Ok(AiResponse {
                ok: true,
                respuesta: Some(answer),
            }) => Ok(answer),
            Ok(_) => {
                warn!("AI endpoint answered without a usable response");
                Err(CobrosError::AiSummary)
            }
            Err(e) => {
                warn!(error = %e, "AI request failed");
                Err(CobrosError::AiSummary)
            }
        }
    }

    /// `GET /reporte/mensual`. `month` is `aaaa-mm`; the backend picks the
    /// current month when it is absent.
    pub fn monthly_report(&self, month: Option<&str>) -> Result<MonthlyReport> {
        let url = self.url("/reporte/mensual");
        let month = month.map(normalize_month).transpose()?;
        let query: Vec<(&str, &str)> = match month.as_deref() {
            Some(m) => vec![("mes", m)],
            None => Vec::new(),
        };

        let body = self.get(&url, &query)?;
        decode(&url, &body)
    }

    /// `POST /facturas/csv` with the file as multipart field `file`.
    /// Returns the number of invoices the backend inserted.
    pub fn upload_csv(&self, path: &Path) -> Result<usize> {
        let url = self.url("/facturas/csv");
        let content = fs::read(path)?;
        check_csv_headers(path, &content)?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "facturas.csv".to_string());
        let body = multipart_file_body("file", &filename, &content);

        debug!(url = %url, bytes = content.len(), "POST multipart");
        let result = self
            .agent
            .post(&url)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .send(&body[..]);
        let reply: CsvImport = decode(&url, &read_body(&url, result)?)?;

        if !reply.ok {
            return Err(CobrosError::ImportRejected(path.to_path_buf()));
        }
        debug!(inserted = reply.insertadas, "imported invoices");
        Ok(reply.insertadas)
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        debug!(url, "GET");
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        read_body(url, request.call())
    }

    fn post_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<String> {
        debug!(url, "POST");
        let body = serde_json::to_string(payload)?;
        let result = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .send(body.as_str());
        read_body(url, result)
    }

    fn put_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<String> {
        debug!(url, "PUT");
        let body = serde_json::to_string(payload)?;
        let result = self
            .agent
            .put(url)
            .header("Content-Type", "application/json")
            .send(body.as_str());
        read_body(url, result)
    }
}

fn read_body(url: &str, result: std::result::Result<Response<Body>, ureq::Error>) -> Result<String> {
    let mut response = result.map_err(|e| transport_error(url, e))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| transport_error(url, e))
}

fn transport_error(url: &str, err: ureq::Error) -> CobrosError {
    match err {
        ureq::Error::StatusCode(status) => CobrosError::Backend {
            status,
            url: url.to_string(),
        },
        other => CobrosError::Disconnected {
            url: url.to_string(),
            source: Box::new(other),
        },
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| CobrosError::Decode {
        url: url.to_string(),
        source: e,
    })
}

const MULTIPART_BOUNDARY: &str = "----cobros-csv-boundary-7f3a9c";

fn multipart_file_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{}\"\r\n",
            filename.replace('"', "")
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// The backend only accepts exactly `cliente,monto,vence` (any order, any case)
fn check_csv_headers(path: &Path, content: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(content);
    let first = text
        .trim_start_matches('\u{feff}')
        .lines()
        .next()
        .unwrap_or("");

    let mut found: Vec<String> = first.split(',').map(|c| c.trim().to_lowercase()).collect();
    found.sort();
    found.dedup();

    if found == ["cliente", "monto", "vence"] {
        Ok(())
    } else {
        Err(CobrosError::CsvHeaders(path.to_path_buf()))
    }
}

fn normalize_month(raw: &str) -> Result<String> {
    let s = raw.trim();
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| CobrosError::InvalidMonth(raw.to_string()))
}
