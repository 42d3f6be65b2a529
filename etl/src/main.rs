use anyhow::Context;
use clap::{Arg, Command};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("Trip Star Schema ETL")
        .version("1.0")
        .about("Builds a star schema from raw ride-hailing trip records")
        .subcommand(
            Command::new("run")
                .about("Run the ETL pipeline once")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let config_path = run_matches
                .get_one::<String>("config")
                .map(|s| s.as_str())
                .unwrap_or("config/etl.toml");

            if let Err(e) = run(config_path).await {
                tracing::error!("ETL pipeline error: {:#}", e);
                eprintln!("ETL pipeline error: {:#}", e);
                process::exit(1);
            }
        }

        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}

async fn run(config_path: &str) -> anyhow::Result<()> {
    let manifest = etl::run_etl_pipeline(config_path)
        .await
        .with_context(|| format!("pipeline run with config {} failed", config_path))?;

    println!(
        "Wrote {} tables for run {}",
        manifest.tables.len(),
        manifest.run_id
    );
    Ok(())
}
