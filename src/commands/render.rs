//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the 'render' subcommand

use std::io::Write;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use tracing::info;

use crate::recipe::DockerfileBuilder;
use crate::recipe::Recipe;

/// Implementation of the "render" subcommand
pub async fn render(matches: &ArgMatches) -> Result<()> {
    let (config_path, config) = super::util::load_config(matches)?;
    let recipe = Recipe::from_config(&config)
        .with_context(|| anyhow!("Building recipe from {}", config_path.display()))?;
    let dockerfile = DockerfileBuilder::new(&recipe).build()?;

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            tokio::fs::write(path, dockerfile.as_str())
                .await
                .with_context(|| anyhow!("Writing Dockerfile to {}", path.display()))?;
            info!("Dockerfile written to {}", path.display());
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout
                .write_all(dockerfile.as_str().as_bytes())
                .context("Writing Dockerfile to stdout")
        }
    }
}
