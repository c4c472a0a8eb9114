pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod pdf;
pub mod webpage;

pub use config::{Args, ExportConfig};
pub use error::{Category, ExportError};
