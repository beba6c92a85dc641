pub mod api;
pub mod config;
pub mod error;
pub mod invoice;

pub use api::{ApiClient, MonthlyReport, StatusLine};
pub use config::{ApiSettings, Config};
pub use error::{CobrosError, Result};
pub use invoice::{format_crc, summarize, Board, Invoice, NewInvoice, Status, Summary};
