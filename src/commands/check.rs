//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the 'check' subcommand

use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use tracing::debug;
use tracing::warn;

use crate::manifest::Manifest;
use crate::recipe::BuildStep;
use crate::recipe::Recipe;

/// Implementation of the "check" subcommand
///
/// Everything that would abort the image build is an error here.
pub async fn check(matches: &ArgMatches) -> Result<()> {
    let mut out = std::io::stdout();
    let (config_path, config) = super::util::load_config(matches)?;
    super::util::report_line(&mut out, "configuration", true, &config_path.display().to_string())?;

    let recipe = Recipe::from_config(&config)
        .with_context(|| anyhow!("Building recipe from {}", config_path.display()))?;
    super::util::report_line(&mut out, "build steps", true, &format!("{} steps in order", recipe.steps().len()))?;

    let context = matches
        .get_one::<PathBuf>("context")
        .cloned()
        .unwrap_or_else(|| {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
    let manifest_path = context.join(config.image().manifest());
    debug!("Checking manifest {}", manifest_path.display());

    let manifest = match Manifest::load(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            super::util::report_line(&mut out, "manifest", false, &e.to_string())?;
            return Err(e).with_context(|| anyhow!("Checking build step '{}'", BuildStep::Dependencies));
        }
    };

    if config.strict_pins() {
        if let Err(e) = manifest.ensure_pinned() {
            super::util::report_line(&mut out, "manifest", false, &e.to_string())?;
            return Err(e).with_context(|| anyhow!("Checking build step '{}'", BuildStep::Dependencies));
        }
    } else {
        for req in manifest.unpinned() {
            warn!("Requirement '{}' (line {}) has no version constraint", req.name(), req.line());
        }
    }

    let exact = manifest.requirements().iter().filter(|r| r.is_exact()).count();
    super::util::report_line(
        &mut out,
        "manifest",
        true,
        &format!(
            "{} requirements, {} pinned exactly ({})",
            manifest.requirements().len(),
            exact,
            manifest.path().display()
        ),
    )
}
