//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::ops::Deref;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use tracing::debug;

use crate::config::NotValidatedConfiguration;

/// A configuration that passed `NotValidatedConfiguration::validate()`
#[derive(Debug)]
pub struct Configuration {
    pub (in crate::config) inner: NotValidatedConfiguration,
}

impl Deref for Configuration {
    type Target = NotValidatedConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Configuration {
    /// Load the recipe from `path`, overlaid by `ASTROVASTU_RECIPE_*` environment variables
    ///
    /// Nested keys are separated by `__`, e.g. `ASTROVASTU_RECIPE_IMAGE__BASE`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading recipe configuration from {}", path.display());
        let mut config = ::config::Config::default();
        config
            .merge(::config::File::from(path).required(true))
            .with_context(|| anyhow::anyhow!("Reading configuration file {}", path.display()))?
            .merge(::config::Environment::with_prefix(crate::consts::RECIPE_ENV_PREFIX).separator("__"))
            .context("Reading configuration from environment")?;

        config
            .try_into::<NotValidatedConfiguration>()
            .context("Parsing configuration")?
            .validate()
            .context("Validating configuration")
    }

    #[cfg(test)]
    pub(crate) fn from_toml(toml: &str) -> Result<Self> {
        let mut config = ::config::Config::default();
        config.merge(::config::File::from_str(toml, ::config::FileFormat::Toml))?;
        config
            .try_into::<NotValidatedConfiguration>()
            .map_err(anyhow::Error::from)
            .and_then(NotValidatedConfiguration::validate)
    }

    /// Absolute path of the reports directory inside the image
    pub fn reports_path(&self) -> PathBuf {
        self.image().app_root().join(self.image().reports_dir())
    }
}
