//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::anyhow;
use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::config::Configuration;

/// Load and validate the recipe configuration named by `--config`
pub fn load_config(matches: &ArgMatches) -> Result<(PathBuf, Configuration)> {
    let path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .ok_or_else(|| anyhow!("No configuration file given"))?;

    Configuration::load(&path).map(|config| (path, config))
}

/// Print one line of a check report
pub fn report_line<W: Write>(out: &mut W, label: &str, passed: bool, detail: &str) -> Result<()> {
    let state = if passed { "ok".green() } else { "FAILED".red() };
    writeln!(out, "{:<18} {:<6} {}", label, state, detail).map_err(anyhow::Error::from)
}

/// The exit code to pass on for a finished child process
///
/// A child killed by a signal is reported the way shells do, as 128 + signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|s| 128 + s))
        .unwrap_or(1)
}
