mod board;
mod model;
mod money;
mod summary;

pub use board::{create_invoice, import_csv, load_board, mark_paid, Board};
pub use model::{parse_input_date, Invoice, NewInvoice, Status, StatusUpdate};
pub use money::format_crc;
pub use summary::{summarize, Standing, Summary};
