//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the 'preflight' subcommand

use anyhow::Result;
use clap::ArgMatches;

use crate::config::RuntimeConfig;
use crate::runtime::preflight;
use crate::runtime::preflight::Preflight;

/// Implementation of the "preflight" subcommand
pub async fn preflight(matches: &ArgMatches) -> Result<()> {
    let mut out = std::io::stdout();
    let config = RuntimeConfig::from_env()?;

    let pf = match Preflight::run(&config) {
        Ok(pf) => pf,
        Err(e) => {
            super::util::report_line(&mut out, "preflight", false, &format!("{:#}", e))?;
            return Err(e);
        }
    };

    super::util::report_line(&mut out, "identity", true, &pf.identity().to_string())?;
    super::util::report_line(&mut out, "reports directory", true, &pf.reports().path().display().to_string())?;
    super::util::report_line(
        &mut out,
        "entrypoint",
        true,
        &format!("{} ({})", config.entrypoint(), pf.module_file().display()),
    )?;

    let skip_port = matches.get_one::<bool>("skip_port").copied().unwrap_or(false);
    if skip_port {
        return super::util::report_line(&mut out, "port", true, "skipped");
    }

    match preflight::probe_port(&config).await {
        Ok(()) => super::util::report_line(&mut out, "port", true, &config.bind_addr()),
        Err(e) => {
            super::util::report_line(&mut out, "port", false, &format!("{:#}", e))?;
            Err(e)
        }
    }
}
