use crate::config::{ExportConfig, PageSize};
use crate::error::{ExportError, Phase, Result};
use crate::webpage::WebPage;
use headless_chrome::types::PrintToPdfOptions;
use std::path::Path;
use tracing::debug;

/// Print parameters for `Page.printToPDF`. Explicit dimensions replace the
/// named format entirely.
pub fn print_options(config: &ExportConfig) -> PrintToPdfOptions {
    let (paper_width, paper_height) = match config.page_size {
        PageSize::Format(format) => {
            let (width, height) = format.dimensions();
            (Some(width), Some(height))
        }
        PageSize::Dimensions { width, height } => {
            (width.map(|w| w.inches()), height.map(|h| h.inches()))
        }
    };

    PrintToPdfOptions {
        landscape: Some(config.landscape),
        print_background: Some(config.print_background),
        scale: Some(config.scale),
        paper_width,
        paper_height,
        margin_top: Some(config.margins.top.inches()),
        margin_right: Some(config.margins.right.inches()),
        margin_bottom: Some(config.margins.bottom.inches()),
        margin_left: Some(config.margins.left.inches()),
        page_ranges: config.page_ranges.clone(),
        ..Default::default()
    }
}

impl WebPage {
    /// Renders the current page state and writes it to `path`, replacing any
    /// existing file.
    pub fn to_pdf(&self, options: PrintToPdfOptions, path: &Path) -> Result<()> {
        println!("📑 Generating PDF...");
        debug!(?options, "print options");

        let pdf = self
            .tab()
            .print_to_pdf(Some(options))
            .map_err(|e| ExportError::from_collaborator(e, Phase::PdfGeneration))?;

        std::fs::write(path, &pdf).map_err(|e| {
            ExportError::PdfGeneration(format!("can't write {}: {e}", path.display()))
        })?;
        debug!(bytes = pdf.len(), path = %path.display(), "pdf written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Args, Length};
    use clap::Parser;

    fn config(extra: &[&str]) -> ExportConfig {
        let mut argv = vec!["webpage2pdf", "https://example.com"];
        argv.extend_from_slice(extra);
        ExportConfig::from_args_in(Args::try_parse_from(argv).unwrap(), Path::new("/work")).unwrap()
    }

    #[test]
    fn named_format_sets_paper_size() {
        let options = print_options(&config(&["--format", "Letter"]));
        assert_eq!(options.paper_width, Some(8.5));
        assert_eq!(options.paper_height, Some(11.0));
    }

    #[test]
    fn explicit_dimensions_ignore_format() {
        let options = print_options(&config(&["-f", "A3", "-w", "960", "-h", "480"]));
        assert_eq!(options.paper_width, Some(10.0));
        assert_eq!(options.paper_height, Some(5.0));
    }

    #[test]
    fn single_dimension_leaves_the_other_to_chrome() {
        let options = print_options(&config(&["--height", "2in"]));
        assert_eq!(options.paper_width, None);
        assert_eq!(options.paper_height, Some(2.0));
    }

    #[test]
    fn margins_scale_and_flags_are_forwarded() {
        let options = print_options(&config(&[
            "--margin-top",
            "96",
            "--margin-right",
            "1in",
            "--margin-bottom",
            "25.4mm",
            "--margin-left",
            "2.54cm",
            "--scale",
            "0.5",
            "--no-background",
            "--landscape",
            "--page-ranges",
            "1-2",
        ]));
        for margin in [
            options.margin_top,
            options.margin_right,
            options.margin_bottom,
            options.margin_left,
        ] {
            assert_eq!(margin, Some(1.0));
        }
        assert_eq!(options.scale, Some(0.5));
        assert_eq!(options.print_background, Some(false));
        assert_eq!(options.landscape, Some(true));
        assert_eq!(options.page_ranges.as_deref(), Some("1-2"));
    }

    #[test]
    fn defaults_print_background_without_margins() {
        let options = print_options(&config(&[]));
        assert_eq!(options.print_background, Some(true));
        assert_eq!(options.margin_top, Some(Length::ZERO.inches()));
        assert_eq!(options.scale, Some(1.0));
        assert_eq!(options.page_ranges, None);
    }
}
