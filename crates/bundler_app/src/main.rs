mod cli;
mod config;
mod run;

use clap::Parser;

fn main() {
    let args = cli::Args::parse();
    match run::run(&args) {
        Ok(summary) => {
            if summary.total_errors > 0 {
                eprintln!(
                    "bundler: {} resource(s) left unbundled across all pages",
                    summary.total_errors
                );
            }
            if summary.failed_jobs > 0 {
                eprintln!("bundler: {} page(s) failed", summary.failed_jobs);
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("bundler: {err:#}");
            std::process::exit(2);
        }
    }
}
