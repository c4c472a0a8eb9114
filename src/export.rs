use crate::browser::Browser;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::pdf;
use std::path::PathBuf;
use tracing::info;

/// Runs one export: launch, navigate, optionally wait, print, close.
pub fn run(config: &ExportConfig) -> Result<PathBuf> {
    println!("🚀 Launching browser...");
    let browser = Browser::launch(&config.launch, config.timeout)?;
    let page = browser.page();

    page.navigate(&config.url, config.timeout)?;

    if let Some(selector) = &config.wait_for {
        page.wait_for(selector, config.timeout)?;
    }

    page.to_pdf(pdf::print_options(config), &config.output_path)?;
    info!(url = %config.url, output = %config.output_path.display(), "export finished");
    println!("✅ PDF has been saved to: {}", config.output_path.display());

    Ok(config.output_path.clone())
}
