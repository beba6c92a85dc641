use chrono::NaiveDate;

use super::model::{Invoice, Status};

/// Where an invoice stands relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Paid,
    /// Pending and due strictly before the reference date
    Overdue,
    /// Pending and due on or after the reference date, or with no due date
    DueSoon,
}

impl Invoice {
    pub fn standing(&self, today: NaiveDate) -> Standing {
        match (self.status, self.due) {
            (Status::Paid, _) => Standing::Paid,
            (Status::Pending, Some(due)) if due < today => Standing::Overdue,
            (Status::Pending, _) => Standing::DueSoon,
        }
    }
}

/// Figures shown above the invoice table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub pending: usize,
    pub overdue: usize,
    pub due_soon: usize,
}

/// Aggregate a complete invoice list.
///
/// Every pending invoice lands in exactly one of `overdue` / `due_soon`, so
/// `pending == overdue + due_soon` always holds.
pub fn summarize(invoices: &[Invoice], today: NaiveDate) -> Summary {
    invoices.iter().fold(Summary::default(), |mut acc, inv| {
        acc.total += inv.amount;
        match inv.standing(today) {
            Standing::Paid => {}
            Standing::Overdue => {
                acc.pending += 1;
                acc.overdue += 1;
            }
            Standing::DueSoon => {
                acc.pending += 1;
                acc.due_soon += 1;
            }
        }
        acc
    })
}
