use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use cobros::api::{ApiClient, MonthlyReport};
use cobros::config::{config_dir, load_config, resolve_api, CONFIG_TEMPLATE};
use cobros::error::{CobrosError, Result};
use cobros::invoice::{
    create_invoice, format_crc, import_csv, load_board, mark_paid, parse_input_date, Board,
    Invoice, NewInvoice,
};

#[derive(Parser)]
#[command(name = "cobros")]
#[command(version, about = "Invoice collections CLI for the Noa Cobros backend", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.cobros)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Backend root address, overrides [api] base_url from config.toml
    #[arg(long, global = true, env = "COBROS_API_BASE")]
    api_base: Option<String>,

    /// Reference date for overdue / due-soon classification (default: today)
    #[arg(long, global = true, value_name = "AAAA-MM-DD")]
    hoy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a config.toml template
    Init,

    /// Check that the backend is reachable
    Estado,

    /// List invoices with totals and due-date summary
    Listar {
        /// Only invoices whose client name contains this text
        #[arg(short, long)]
        q: Option<String>,
    },

    /// Create a new pending invoice
    Crear {
        /// Client name
        #[arg(long)]
        cliente: String,

        /// Amount in colones
        #[arg(long, allow_hyphen_values = true)]
        monto: String,

        /// Due date (aaaa-mm-dd or dd/mm/aaaa)
        #[arg(long)]
        vence: String,
    },

    /// Import invoices from a CSV file with headers cliente,monto,vence
    Importar {
        /// Path to the CSV file
        archivo: PathBuf,
    },

    /// Mark a pending invoice as paid
    Pagar {
        /// Invoice id as shown by 'listar'
        id: String,
    },

    /// Ask the AI endpoint for a collections summary of the given text
    Ia {
        /// Text to summarize
        texto: String,
    },

    /// Show the backend's monthly report
    Reporte {
        /// Month to report (aaaa-mm, default: current month)
        #[arg(long)]
        mes: Option<String>,
    },
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    // Only `init` runs without a backend session
    let session = || Session::open(&cfg_dir, cli.api_base.as_deref(), cli.hoy.as_deref());

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Estado => cmd_status(&session()?.api),
        Commands::Listar { q } => {
            let s = session()?;
            cmd_list(&s.api, q.as_deref(), s.today)
        }
        Commands::Crear {
            cliente,
            monto,
            vence,
        } => {
            let s = session()?;
            cmd_create(&s.api, &cliente, &monto, &vence, s.today)
        }
        Commands::Importar { archivo } => {
            let s = session()?;
            cmd_import(&s.api, &archivo, s.today)
        }
        Commands::Pagar { id } => {
            let s = session()?;
            cmd_pay(&s.api, &id, s.today)
        }
        Commands::Ia { texto } => cmd_ai(&session()?.api, &texto),
        Commands::Reporte { mes } => cmd_report(&session()?.api, mes.as_deref()),
    }
}

/// Backend client plus the reference date for classification
struct Session {
    api: ApiClient,
    today: NaiveDate,
}

impl Session {
    /// Resolved once; every request of the command goes through this client
    fn open(cfg_dir: &Path, api_base: Option<&str>, hoy: Option<&str>) -> Result<Self> {
        let config = load_config(cfg_dir)?;
        let (base, timeout) = resolve_api(&config, api_base);
        tracing::debug!(base = %base, "using backend");

        let today = match hoy {
            Some(s) => parse_input_date(s)?,
            None => chrono::Local::now().date_naive(),
        };

        Ok(Self {
            api: ApiClient::new(&base, timeout),
            today,
        })
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(CobrosError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized cobros config at: {}", cfg_dir.display());
    println!();
    println!("Point it at your backend:");
    println!("  $EDITOR {}/config.toml", cfg_dir.display());
    println!();
    println!("Then list your invoices:");
    println!("  cobros listar");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CLIENTE")]
    client: String,
    #[tabled(rename = "MONTO")]
    amount: String,
    #[tabled(rename = "VENCE")]
    due: String,
    #[tabled(rename = "ESTADO")]
    status: String,
    #[tabled(rename = "ACCIÓN")]
    action: String,
}

impl From<&Invoice> for InvoiceRow {
    fn from(inv: &Invoice) -> Self {
        // Only pending rows get the pay action
        let action = if inv.is_paid() {
            "Pagada".to_string()
        } else if inv.id.is_empty() {
            "-".to_string()
        } else {
            format!("cobros pagar {}", inv.id)
        };

        Self {
            id: inv.id.clone(),
            client: inv.client.clone(),
            amount: format_crc(Some(inv.amount)),
            due: inv.due.map(format_day).unwrap_or_else(|| "-".to_string()),
            status: inv.status.to_string(),
            action,
        }
    }
}

fn print_invoices(invoices: &[Invoice]) {
    if invoices.is_empty() {
        println!("No hay facturas.");
        return;
    }

    let rows: Vec<InvoiceRow> = invoices.iter().map(InvoiceRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn print_board(board: &Board) {
    print_invoices(&board.invoices);

    let s = &board.summary;
    println!();
    println!(
        "Total: {} · Pendientes: {}",
        format_crc(Some(s.total)),
        s.pending
    );
    println!();
    println!("Resumen al {}", format_day(board.today));
    println!("  Total:       {}", format_crc(Some(s.total)));
    println!("  Pendientes:  {}", s.pending);
    println!("  Vencidas:    {}", s.overdue);
    println!("  Por vencer:  {}", s.due_soon);
}

fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Print the backend health line
fn cmd_status(api: &ApiClient) -> Result<()> {
    println!("{}", api.ping());
    Ok(())
}

/// List invoices and the derived summary
fn cmd_list(api: &ApiClient, query: Option<&str>, today: NaiveDate) -> Result<()> {
    let board = load_board(api, query, today)?;
    print_board(&board);
    Ok(())
}

/// Create an invoice and show the refreshed board
fn cmd_create(
    api: &ApiClient,
    client: &str,
    amount: &str,
    due: &str,
    today: NaiveDate,
) -> Result<()> {
    let new = NewInvoice::parse(client, amount, due)?;
    let board = create_invoice(api, &new, today)?;

    println!(
        "Factura creada para {} por {} (vence {})",
        new.client,
        format_crc(Some(new.amount)),
        format_day(new.due)
    );
    println!();
    print_board(&board);
    Ok(())
}

/// Upload a CSV of invoices and show the refreshed board
fn cmd_import(api: &ApiClient, path: &Path, today: NaiveDate) -> Result<()> {
    let (inserted, board) = import_csv(api, path, today)?;

    println!("Facturas importadas: {inserted}");
    println!();
    print_board(&board);
    Ok(())
}

/// Mark an invoice paid and show the refreshed board
fn cmd_pay(api: &ApiClient, id: &str, today: NaiveDate) -> Result<()> {
    let board = mark_paid(api, id, today)?;

    println!("Factura {id} marcada como pagada");
    println!();
    print_board(&board);
    Ok(())
}

fn cmd_ai(api: &ApiClient, text: &str) -> Result<()> {
    let answer = api.ai_summary(text)?;
    println!("{answer}");
    Ok(())
}

/// Print the backend's monthly report
fn cmd_report(api: &ApiClient, month: Option<&str>) -> Result<()> {
    let MonthlyReport { summary, invoices } = api.monthly_report(month)?;

    println!("Reporte mensual {}", summary.month);
    println!("{}", "-".repeat(40));
    print_invoices(&invoices);
    println!();
    println!("  Facturas:    {}", summary.count);
    println!("  Monto total: {}", format_crc(Some(summary.total)));
    println!("  Pendientes:  {}", summary.pending);
    println!("  Vencidas:    {}", summary.overdue);
    println!("  Por vencer:  {}", summary.due_soon);

    Ok(())
}
