use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validation,
    Launch,
    Navigation,
    Wait,
    PdfGeneration,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Validation => "argument validation",
            Phase::Launch => "browser launch",
            Phase::Navigation => "page navigation",
            Phase::Wait => "waiting for selector",
            Phase::PdfGeneration => "PDF generation",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("{message}")]
    Navigation { status: Option<u16>, message: String },
    #[error("{message}")]
    Timeout { phase: Phase, message: String },
    #[error("Browser connection lost: {message}")]
    Connection { phase: Phase, message: String },
    #[error("Protocol error: {message}")]
    Protocol { phase: Phase, message: String },
    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Message fragments Chrome's transport produces when the process dies or
/// the websocket drops mid-call.
const CONNECTION_SIGNATURES: [&str; 4] = [
    "socket hang up",
    "connection closed",
    "connection reset",
    "broken pipe",
];

impl ExportError {
    /// Maps an error returned by `headless_chrome` into the closed set.
    pub fn from_collaborator(err: anyhow::Error, phase: Phase) -> Self {
        let message = format!("{err:#}");

        if err.downcast_ref::<headless_chrome::util::Timeout>().is_some() {
            return ExportError::Timeout { phase, message };
        }
        if err.downcast_ref::<headless_chrome::types::RemoteError>().is_some() {
            return ExportError::Protocol { phase, message };
        }

        let lower = message.to_ascii_lowercase();
        if CONNECTION_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
            return ExportError::Connection { phase, message };
        }

        match phase {
            Phase::Validation => ExportError::Validation(message),
            Phase::Launch => ExportError::Launch(message),
            Phase::Navigation => ExportError::Navigation { status: None, message },
            Phase::Wait => ExportError::Protocol { phase, message },
            Phase::PdfGeneration => ExportError::PdfGeneration(message),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ExportError::Validation(_) => Phase::Validation,
            ExportError::Launch(_) => Phase::Launch,
            ExportError::Navigation { .. } => Phase::Navigation,
            ExportError::Timeout { phase, .. }
            | ExportError::Connection { phase, .. }
            | ExportError::Protocol { phase, .. } => *phase,
            ExportError::PdfGeneration(_) => Phase::PdfGeneration,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ExportError::Validation(_) => "ValidationError",
            ExportError::Launch(_) => "LaunchError",
            ExportError::Navigation { .. } => "NavigationError",
            ExportError::Timeout { .. } => "TimeoutError",
            ExportError::Connection { .. } => "ConnectionError",
            ExportError::Protocol { .. } => "ProtocolError",
            ExportError::PdfGeneration(_) => "PdfGenerationError",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ExportError::Timeout { .. } => Category::Timeout,
            ExportError::Connection { .. } | ExportError::Launch(_) => Category::Connection,
            ExportError::Protocol { .. } => Category::Protocol,
            ExportError::Validation(_)
            | ExportError::Navigation { .. }
            | ExportError::PdfGeneration(_) => Category::Generic,
        }
    }

    pub fn report(&self) -> Report<'_> {
        Report(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Timeout,
    Connection,
    Protocol,
    Generic,
}

impl Category {
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            Category::Timeout => &[
                "Check your internet connection",
                "Increase the navigation timeout using --timeout option",
                "The website might be blocking automated access",
            ],
            Category::Connection => &[
                "Check your internet connection",
                "Try using --no-sandbox option",
                "Try using --disable-dev-shm-usage option",
                "Make sure Chrome is installed on your system",
            ],
            Category::Protocol => &[
                "The website might require authentication",
                "Try using --wait-for option to ensure page is fully loaded",
            ],
            Category::Generic => &[
                "Check if the URL is valid and accessible",
                "Check your internet connection",
                "The website might be blocking automated access",
            ],
        }
    }
}

pub struct Report<'a>(&'a ExportError);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err = self.0;
        writeln!(f, "❌ Error occurred during: {}", err.phase())?;
        writeln!(f, "Error type: {}", err.kind_name())?;
        writeln!(f, "Error message: {err}")?;
        writeln!(f)?;
        write!(f, "Possible solutions:")?;
        for (i, hint) in err.category().remediation().iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, hint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_recognised_by_type() {
        let err = anyhow::Error::new(headless_chrome::util::Timeout);
        let mapped = ExportError::from_collaborator(err, Phase::Navigation);
        assert_eq!(mapped.category(), Category::Timeout);
        assert_eq!(mapped.phase(), Phase::Navigation);
    }

    #[test]
    fn remote_error_is_a_protocol_failure() {
        let err = anyhow::Error::new(headless_chrome::types::RemoteError {
            code: -32000,
            message: "Cannot navigate to invalid URL".to_string(),
        });
        let mapped = ExportError::from_collaborator(err, Phase::Navigation);
        assert!(matches!(mapped, ExportError::Protocol { .. }));
        assert_eq!(mapped.category(), Category::Protocol);
        assert_eq!(mapped.phase(), Phase::Navigation);
        assert!(mapped.to_string().contains("Cannot navigate to invalid URL"));
    }

    #[test]
    fn socket_hang_up_is_a_connection_failure() {
        let err = anyhow::anyhow!("Error: socket hang up");
        let mapped = ExportError::from_collaborator(err, Phase::PdfGeneration);
        assert!(matches!(mapped, ExportError::Connection { .. }));
        assert_eq!(mapped.category(), Category::Connection);
        assert_eq!(mapped.phase(), Phase::PdfGeneration);
    }

    #[test]
    fn unknown_failures_keep_the_phase_kind() {
        let launch = ExportError::from_collaborator(anyhow::anyhow!("no chrome"), Phase::Launch);
        assert!(matches!(launch, ExportError::Launch(_)));
        assert_eq!(launch.category(), Category::Connection);

        let pdf = ExportError::from_collaborator(anyhow::anyhow!("boom"), Phase::PdfGeneration);
        assert!(matches!(pdf, ExportError::PdfGeneration(_)));
        assert_eq!(pdf.category(), Category::Generic);

        let wait = ExportError::from_collaborator(anyhow::anyhow!("detached"), Phase::Wait);
        assert_eq!(wait.category(), Category::Protocol);
    }

    #[test]
    fn report_lists_numbered_hints() {
        let err = ExportError::Navigation {
            status: Some(404),
            message: "Failed to load page: 404 Not Found".to_string(),
        };
        let report = err.report().to_string();
        assert!(report.starts_with("❌ Error occurred during: page navigation"));
        assert!(report.contains("Error type: NavigationError"));
        assert!(report.contains("404"));
        assert!(report.contains("1. Check if the URL is valid and accessible"));
        assert!(report.ends_with("3. The website might be blocking automated access"));
    }

    #[test]
    fn every_category_has_hints() {
        for category in [
            Category::Timeout,
            Category::Connection,
            Category::Protocol,
            Category::Generic,
        ] {
            assert!(!category.remediation().is_empty());
        }
    }
}
