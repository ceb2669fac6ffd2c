// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use finitor::config::Config;
use finitor::{cli, commands, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config_path = match matches.get_one::<String>("config") {
        Some(p) => PathBuf::from(p),
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;
    let conn = db::open_or_init(&config)?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init::handle(&config, &config_path)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, &config, sub)?,
        Some(("balance", sub)) => commands::reports::balance(&conn, &config, sub)?,
        Some(("summary", sub)) => commands::reports::handle(&conn, &config, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &config, sub)?,
        Some(("currency", sub)) => commands::currencies::handle(&conn, &config, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &config, sub)?,
        Some(("alerts", sub)) => commands::alerts::handle(&conn, &config, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
