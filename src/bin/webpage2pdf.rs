use clap::Parser;
use clap::error::ErrorKind;
use std::process::ExitCode;
use tracing::Level;
use webpage2pdf::{Args, ExportConfig, ExportError, export};

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(error: &ExportError) -> ExitCode {
    eprintln!("\n{}", error.report());
    ExitCode::FAILURE
}

fn main() -> ExitCode {

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => return fail(&ExportError::Validation(e.to_string().trim_end().to_string())),
    };

    init_logging(args.verbose);

    let config = match ExportConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    match export::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }

}
