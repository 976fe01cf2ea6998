use clap::Parser;
use lifecycle_bench::utils::helpers::init_tracing;
use lifecycle_bench::{run_benchmark, BenchConfig, Cli};

#[tokio::main]
async fn main() {
    // On Windows, set the console output codepage to UTF-8
    #[cfg(windows)]
    {
        if !std::process::Command::new("chcp")
            .arg("65001")
            .status()
            .map_or(false, |s| s.success())
        {
            eprintln!("Warning: Failed to set console codepage to UTF-8. Some characters may not display correctly.");
        }
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match BenchConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_benchmark(config).await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
