//! Subprocess extraction CLI entry point

use std::{process, str::FromStr};

use clap::Parser;
use log::{debug, error, info, LevelFilter};

use process_extract_cli::{Args, Outcome};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!("Parsed arguments: {:?}", args);

    match process_extract_cli::run(&args).await {
        Ok(Outcome::Checked {
            has_nested_sub_processes,
            element_count,
        }) => {
            println!(
                "{}: nested subprocesses: {}, elements: {}",
                args.container, has_nested_sub_processes, element_count
            );
        }
        Ok(Outcome::Extracted { xml: Some(xml), .. }) => print!("{}", xml),
        Ok(Outcome::Extracted { name, xml: None }) => info!("Extracted '{}'", name),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
