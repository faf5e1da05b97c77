//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The image build recipe
//!
//! A recipe is the strictly linear sequence of build steps plus the values they are rendered
//! with. There is exactly one recipe per configuration.

use std::path::Path;

use getset::Getters;
use serde::Serialize;
use tracing::trace;

use crate::config::Configuration;
use crate::config::InstallScope;
use crate::error::BuildError;
use crate::runtime::launch::LaunchCommand;

mod dockerfile;
pub use dockerfile::*;

mod step;
pub use step::*;

/// The runtime identity, as the templates see it
#[derive(Serialize, Debug)]
pub struct IdentityContext {
    name: String,
    home: String,
    shell: String,
    local_bin: String,
}

/// Everything a build step template can refer to
#[derive(Serialize, Debug, Getters)]
pub struct RecipeContext {
    #[getset(get = "pub")]
    base: String,

    /// Space separated, empty if there are none
    system_packages: String,

    identity: IdentityContext,

    #[getset(get = "pub")]
    app_root: String,

    reports_path: String,

    /// The manifest in the build context
    manifest: String,

    /// Where the manifest is copied to in the image
    manifest_target: String,

    user_scope: bool,

    /// `dotted.module:attribute` of the ASGI application
    entrypoint: String,

    /// The variable the port is read from at container start
    port_env: String,

    /// Exposed, and used if `port_env` is unset
    port: u16,

    /// The launch command in exec form, `["sh", "-c", "..."]`
    #[getset(get = "pub")]
    cmd: String,
}

#[derive(Debug, Getters)]
pub struct Recipe {
    #[getset(get = "pub")]
    steps: Vec<BuildStep>,

    #[getset(get = "pub")]
    context: RecipeContext,
}

impl Recipe {
    pub fn from_config(config: &Configuration) -> Result<Self, BuildError> {
        let image = config.image();
        let identity = config.identity();
        let entrypoint = config.entrypoint();

        let launch = LaunchCommand::for_image(entrypoint)?;
        let cmd = vec![String::from("sh"), String::from("-c"), launch.shell_line()];

        let manifest_file = image
            .manifest()
            .file_name()
            .map(Path::new)
            .ok_or_else(|| BuildError::MissingManifest {
                path: image.manifest().clone(),
            })?;

        let context = RecipeContext {
            base: image.base().to_string(),
            system_packages: image.system_packages().join(" "),
            identity: IdentityContext {
                name: identity.name().clone(),
                home: identity.home().display().to_string(),
                shell: identity.shell().display().to_string(),
                local_bin: identity.local_bin().display().to_string(),
            },
            app_root: image.app_root().display().to_string(),
            reports_path: config.reports_path().display().to_string(),
            manifest: image.manifest().display().to_string(),
            manifest_target: image.app_root().join(manifest_file).display().to_string(),
            user_scope: image.install_scope() == InstallScope::User,
            entrypoint: launch.module().to_string(),
            port_env: entrypoint.port_env().clone(),
            port: entrypoint.fallback_port(),
            // a Vec<String> always serializes
            cmd: serde_json::to_string(&cmd).unwrap_or_default(),
        };

        trace!("Recipe context: {:?}", context);
        Self::new(BuildStep::ALL.to_vec(), context)
    }

    /// Build a recipe from explicit steps, refusing any order other than 1..=9
    pub fn new(steps: Vec<BuildStep>, context: RecipeContext) -> Result<Self, BuildError> {
        check_order(&steps)?;
        Ok(Recipe { steps, context })
    }
}

fn check_order(steps: &[BuildStep]) -> Result<(), BuildError> {
    for (idx, step) in steps.iter().enumerate() {
        let expected = idx + 1;
        if step.ordinal() != expected {
            return Err(BuildError::StepOrder {
                step: step.to_string(),
                expected,
                found: step.ordinal(),
            });
        }
    }

    if let Some(missing) = BuildStep::ALL.get(steps.len()) {
        return Err(BuildError::StepOrder {
            step: missing.to_string(),
            expected: missing.ordinal(),
            found: 0,
        });
    }

    Ok(())
}
