//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::anyhow;
use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod astro;
mod cli;
mod commands;
mod config;
mod consts;
mod error;
mod manifest;
mod recipe;
mod runtime;
mod server;
mod util;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!("Debugging enabled");

    let cli = cli::cli().get_matches();

    match cli.subcommand() {
        Some(("render", matches)) => commands::render(matches).await?,
        Some(("check", matches)) => commands::check(matches).await?,
        Some(("preflight", matches)) => commands::preflight(matches).await?,
        Some(("launch", matches)) => {
            let code = commands::launch(matches).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Some(("serve", _)) => commands::serve().await?,

        Some((other, _)) => return Err(anyhow!("Unknown subcommand: {}", other)),
        None => return Err(anyhow!("No subcommand")),
    }

    Ok(())
}
