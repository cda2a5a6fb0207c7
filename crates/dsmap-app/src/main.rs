//! Main application entry point (native).

use clap::Parser;
use dsmap_app::{Cli, run};

fn main() {
    env_logger::init();
    log::info!("Starting dsmap");

    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => {
            if cli.stdout {
                println!("{}", report.json);
            } else if let Some(path) = report.output {
                println!("{}", path.display());
            }
            if !report.skipped.is_empty() {
                eprintln!("Skipped {} input(s)", report.skipped.len());
            }
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
