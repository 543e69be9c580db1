use clap::Parser;

use csr_profiler_lib::commands::{run, Cli};
use csr_profiler_lib::error::ErrorReport;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        let report = ErrorReport::from(&e);
        eprintln!("Error: {}", report.message);
        if !report.recovery_suggestion.is_empty() {
            eprintln!("{}", report.recovery_suggestion);
        }
        std::process::exit(1);
    }
}
