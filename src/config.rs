use crate::error::{ExportError, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Converts a webpage to a PDF using a headless browser
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_help_flag = true)]
pub struct Args {
    /// URL to convert to PDF
    pub url: String,

    /// Output PDF file name
    #[arg(short, long, default_value = "output.pdf")]
    pub output: PathBuf,

    /// Paper format (A4, A3, Letter, etc)
    #[arg(short, long, default_value = "A4")]
    pub format: String,

    /// Page width, pixels unless suffixed with in, cm or mm (overrides format)
    #[arg(short, long, allow_hyphen_values = true)]
    pub width: Option<String>,

    /// Page height, pixels unless suffixed with in, cm or mm (overrides format)
    #[arg(short = 'h', long, allow_hyphen_values = true)]
    pub height: Option<String>,

    /// Top margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub margin_top: String,

    /// Right margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub margin_right: String,

    /// Bottom margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub margin_bottom: String,

    /// Left margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub margin_left: String,

    /// Scale of the webpage rendering
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub scale: String,

    /// Print background graphics (default)
    #[arg(long, overrides_with = "no_background")]
    pub background: bool,

    /// Do not print background graphics
    #[arg(long, overrides_with = "background")]
    pub no_background: bool,

    /// Landscape orientation
    #[arg(long)]
    pub landscape: bool,

    /// Pages to print, e.g. "1-5, 8"
    #[arg(long)]
    pub page_ranges: Option<String>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "30000", allow_hyphen_values = true)]
    pub timeout: String,

    /// Wait for specific element to load
    #[arg(long)]
    pub wait_for: Option<String>,

    /// Disable sandbox (use with caution)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Disable /dev/shm usage (for Docker/CI environments)
    #[arg(long)]
    pub disable_dev_shm_usage: bool,

    /// Path to Chrome executable
    #[arg(long, env = "CHROME_PATH")]
    pub executable_path: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Length {
    inches: f64,
}

impl Length {
    pub const ZERO: Length = Length { inches: 0.0 };

    pub fn from_inches(inches: f64) -> Self {
        Self { inches }
    }

    pub fn from_pixels(px: f64) -> Self {
        Self { inches: px / 96.0 }
    }

    pub fn inches(&self) -> f64 {
        self.inches
    }
}

/// Units understood by [`Length`] and how many of each make an inch.
const UNITS: [(&str, f64); 4] = [("px", 96.0), ("in", 1.0), ("cm", 2.54), ("mm", 25.4)];

impl FromStr for Length {
    type Err = String;

    /// Accepts `96`, `96px`, `1in`, `2.54cm` or `25.4mm`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let (number, per_inch) = UNITS
            .iter()
            .find_map(|(unit, per_inch)| text.strip_suffix(unit).map(|n| (n, *per_inch)))
            .unwrap_or((text.as_str(), 96.0));

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| format!("expected a number optionally followed by px, in, cm or mm, got {s:?}"))?;
        if !value.is_finite() {
            return Err(format!("length must be finite, got {s:?}"));
        }

        Ok(Self { inches: value / per_inch })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaperFormat {
    Letter,
    Legal,
    Tabloid,
    Ledger,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
}

impl PaperFormat {
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Legal => (8.5, 14.0),
            PaperFormat::Tabloid => (11.0, 17.0),
            PaperFormat::Ledger => (17.0, 11.0),
            PaperFormat::A0 => (33.1102, 46.811),
            PaperFormat::A1 => (23.3858, 33.1102),
            PaperFormat::A2 => (16.5354, 23.3858),
            PaperFormat::A3 => (11.6929, 16.5354),
            PaperFormat::A4 => (8.2677, 11.6929),
            PaperFormat::A5 => (5.8268, 8.2677),
            PaperFormat::A6 => (4.1339, 5.8268),
        }
    }
}

impl FromStr for PaperFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let format = match s.trim().to_ascii_lowercase().as_str() {
            "letter" => PaperFormat::Letter,
            "legal" => PaperFormat::Legal,
            "tabloid" => PaperFormat::Tabloid,
            "ledger" => PaperFormat::Ledger,
            "a0" => PaperFormat::A0,
            "a1" => PaperFormat::A1,
            "a2" => PaperFormat::A2,
            "a3" => PaperFormat::A3,
            "a4" => PaperFormat::A4,
            "a5" => PaperFormat::A5,
            "a6" => PaperFormat::A6,
            _ => return Err(format!("Unknown paper format: {s}")),
        };
        Ok(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PageSize {
    Format(PaperFormat),
    /// Explicit size; a missing side is left to the browser's default.
    Dimensions {
        width: Option<Length>,
        height: Option<Length>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: Length::ZERO,
            right: Length::ZERO,
            bottom: Length::ZERO,
            left: Length::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchFlags {
    pub sandbox: bool,
    pub disable_dev_shm_usage: bool,
    pub executable_path: Option<PathBuf>,
}

impl Default for LaunchFlags {
    fn default() -> Self {
        Self {
            sandbox: true,
            disable_dev_shm_usage: false,
            executable_path: None,
        }
    }
}

impl LaunchFlags {
    /// Extra Chrome arguments on top of the ones `headless_chrome` always passes.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.sandbox {
            args.push("--disable-setuid-sandbox".to_string());
        }
        if self.disable_dev_shm_usage {
            args.push("--disable-dev-shm-usage".to_string());
        }
        args.extend(
            [
                "--disable-gpu",
                "--disable-software-rasterizer",
                "--disable-extensions",
                "--no-first-run",
            ]
            .map(String::from),
        );
        // Chrome aborts on --no-zygote while the sandbox is active.
        if !self.sandbox {
            args.push("--no-zygote".to_string());
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub url: Url,
    pub output_path: PathBuf,
    pub page_size: PageSize,
    pub margins: Margins,
    pub scale: f64,
    pub print_background: bool,
    pub landscape: bool,
    pub page_ranges: Option<String>,
    pub timeout: Duration,
    pub wait_for: Option<String>,
    pub launch: LaunchFlags,
}

impl ExportConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            ExportError::Validation(format!("Can't determine the current directory: {e}"))
        })?;
        Self::from_args_in(args, &cwd)
    }

    pub fn from_args_in(args: Args, cwd: &Path) -> Result<Self> {
        let url = parse_url(&args.url)?;

        let width = args.width.as_deref().map(|w| parse_length("--width", w)).transpose()?;
        let height = args.height.as_deref().map(|h| parse_length("--height", h)).transpose()?;
        let page_size = if width.is_some() || height.is_some() {
            PageSize::Dimensions { width, height }
        } else {
            PageSize::Format(args.format.parse::<PaperFormat>().map_err(ExportError::Validation)?)
        };

        let margins = Margins {
            top: parse_length("--margin-top", &args.margin_top)?,
            right: parse_length("--margin-right", &args.margin_right)?,
            bottom: parse_length("--margin-bottom", &args.margin_bottom)?,
            left: parse_length("--margin-left", &args.margin_left)?,
        };

        let scale: f64 = args
            .scale
            .trim()
            .parse()
            .map_err(|_| ExportError::Validation(format!("Invalid --scale value: {:?}", args.scale)))?;

        let timeout_ms: i64 = args.timeout.trim().parse().map_err(|_| {
            ExportError::Validation(format!(
                "Invalid --timeout value: {:?}, expected milliseconds",
                args.timeout
            ))
        })?;

        Ok(Self {
            url,
            output_path: cwd.join(&args.output),
            page_size,
            margins,
            scale,
            print_background: !args.no_background,
            landscape: args.landscape,
            page_ranges: args.page_ranges,
            // Negative timeouts behave like 0: every wait expires at once.
            timeout: Duration::from_millis(timeout_ms.max(0).unsigned_abs()),
            wait_for: args.wait_for,
            launch: LaunchFlags {
                sandbox: !args.no_sandbox,
                disable_dev_shm_usage: args.disable_dev_shm_usage,
                executable_path: args.executable_path,
            },
        })
    }
}

/// Schemes that legitimately carry no host.
const HOSTLESS_SCHEMES: [&str; 3] = ["file", "data", "about"];

fn parse_url(raw: &str) -> Result<Url> {
    let invalid = || {
        ExportError::Validation(format!(
            "Invalid URL: {raw}. Please provide a valid URL including protocol (e.g., https://)"
        ))
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    // `localhost:8080` parses with `localhost` as the scheme.
    if !url.has_host() && !HOSTLESS_SCHEMES.contains(&url.scheme()) {
        return Err(invalid());
    }
    Ok(url)
}

fn parse_length(option: &str, raw: &str) -> Result<Length> {
    raw.parse()
        .map_err(|e| ExportError::Validation(format!("Invalid {option} value: {e}")))
}
