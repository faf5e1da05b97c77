//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the 'launch' subcommand

use anyhow::Result;
use clap::ArgMatches;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::runtime::launch::LaunchCommand;
use crate::runtime::preflight;
use crate::runtime::preflight::Preflight;
use crate::util::EnvironmentVariableName;

/// Implementation of the "launch" subcommand
///
/// Returns the exit code of the server process.
pub async fn launch(matches: &ArgMatches) -> Result<i32> {
    let config = RuntimeConfig::from_env()?;
    let pf = Preflight::run(&config)?;
    preflight::probe_port(&config).await?;

    let server = matches
        .get_one::<String>("server")
        .map(String::as_str)
        .unwrap_or(crate::consts::DEFAULT_SERVER);

    let server_args = matches
        .get_many::<String>("server_args")
        .map(|args| args.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    let additional_env = matches
        .get_many::<(EnvironmentVariableName, String)>("env")
        .map(|pairs| pairs.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    let cmd = LaunchCommand::for_runtime(&config, server, server_args);
    let status = cmd.run(&config, pf.app_root(), &additional_env).await?;
    info!("Server exited: {}", status);

    Ok(super::util::exit_code(status))
}
