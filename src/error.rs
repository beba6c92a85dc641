use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CobrosError {
    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Sin conexión con {url}: {source}")]
    Disconnected {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("El servidor respondió {status} para {url}")]
    Backend { status: u16, url: String },

    #[error("Respuesta inválida de {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Error consultando IA")]
    AiSummary,

    #[error("El cliente es obligatorio")]
    MissingClient,

    #[error("Monto inválido '{0}'. Use un número mayor o igual a cero.")]
    InvalidAmount(String),

    #[error("Fecha inválida '{0}'. Use aaaa-mm-dd o dd/mm/aaaa.")]
    InvalidDate(String),

    #[error("Mes inválido '{0}'. Use aaaa-mm.")]
    InvalidMonth(String),

    #[error("El CSV {0} debe tener los encabezados cliente,monto,vence")]
    CsvHeaders(PathBuf),

    #[error("El servidor rechazó la importación de {0}")]
    ImportRejected(PathBuf),

    #[error("Factura '{0}' no existe")]
    InvoiceNotFound(String),

    #[error("Factura '{0}' ya está pagada")]
    AlreadyPaid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CobrosError>;
