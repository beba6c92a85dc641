use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use super::model::{Invoice, NewInvoice};
use super::summary::{summarize, Summary};
use crate::api::ApiClient;
use crate::error::{CobrosError, Result};

/// A complete invoice list together with the figures derived from it.
///
/// Boards are never patched. Every action ends by fetching the list again
/// and building a new one, so the summary always matches the backend's
/// state at the most recent read.
#[derive(Debug, Clone)]
pub struct Board {
    pub invoices: Vec<Invoice>,
    pub summary: Summary,
    pub today: NaiveDate,
}

impl Board {
    pub fn new(invoices: Vec<Invoice>, today: NaiveDate) -> Self {
        let summary = summarize(&invoices, today);
        Self {
            invoices,
            summary,
            today,
        }
    }
}

/// Fetch the invoice list and aggregate it
pub fn load_board(api: &ApiClient, query: Option<&str>, today: NaiveDate) -> Result<Board> {
    let invoices = api.list_invoices(query)?;
    Ok(Board::new(invoices, today))
}

/// Create an invoice, then rebuild the board from a fresh listing
pub fn create_invoice(api: &ApiClient, invoice: &NewInvoice, today: NaiveDate) -> Result<Board> {
    api.create_invoice(invoice)?;
    info!(client = %invoice.client, due = %invoice.due, "invoice created");
    load_board(api, None, today)
}

/// Upload a CSV of invoices, then rebuild the board from a fresh listing.
/// Returns how many invoices the backend inserted.
pub fn import_csv(api: &ApiClient, path: &Path, today: NaiveDate) -> Result<(usize, Board)> {
    let inserted = api.upload_csv(path)?;
    info!(inserted, file = %path.display(), "invoices imported");
    let board = load_board(api, None, today)?;
    Ok((inserted, board))
}

/// Mark a pending invoice paid, then rebuild the board from a fresh listing.
///
/// Only pending invoices can be marked. Blank, unknown or already paid ids
/// fail before anything is sent.
pub fn mark_paid(api: &ApiClient, id: &str, today: NaiveDate) -> Result<Board> {
    if id.trim().is_empty() {
        return Err(CobrosError::InvoiceNotFound(id.to_string()));
    }

    let current = api.list_invoices(None)?;
    let invoice = current
        .iter()
        .find(|inv| inv.id == id)
        .ok_or_else(|| CobrosError::InvoiceNotFound(id.to_string()))?;

    if invoice.is_paid() {
        return Err(CobrosError::AlreadyPaid(id.to_string()));
    }

    api.set_paid(id)?;
    info!(id, "invoice marked paid");
    load_board(api, None, today)
}
