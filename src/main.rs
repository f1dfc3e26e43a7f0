use std::{net::SocketAddr, process::ExitCode};

use clap::Parser as _;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use htguard::{Cli, Commands, LogFormat, hash_password, reconcile_once, run_server};

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(if cli.debug {
            LevelFilter::DEBUG.into()
        } else {
            LevelFilter::INFO.into()
        })
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_ansi(!cli.no_color)
        .with_env_filter(filter)
        .with_target(false);
    match cli.log_format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Some(Commands::HashPassword {}) => {
            if let Err(err) = hash_password() {
                error!(%err, "failed to hash password");
                return ExitCode::FAILURE;
            }
        }
        Some(Commands::Reconcile {}) => {
            let report = match reconcile_once(&cli) {
                Ok(report) => report,
                Err(err) => {
                    error!(%err, "failed to reconcile");
                    return ExitCode::FAILURE;
                }
            };
            println!("credential file: {}", report.credential);
            for rule in &report.rules {
                println!("{} block: {}", rule.resource, rule.outcome);
            }
        }
        None => {
            let addr: SocketAddr = match cli.bind.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    error!(%err, bind = %cli.bind, "invalid host:port pair");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(err) = run_server(addr, &cli).await {
                error!(%err, "failed to start the server");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
