use clap::Parser;

use fincalc::cli::{Cli, run};
use fincalc::telemetry::init_telemetry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_telemetry();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "fincalc failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
