//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::Component;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::CopyGetters;
use getset::Getters;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::config::util::*;
use crate::config::Configuration;
use crate::config::EntrypointConfig;
use crate::config::IdentityConfig;
use crate::config::ImageConfig;
use crate::error::BuildError;

lazy_static! {
    static ref USER_NAME_RE: Regex = Regex::new("^[a-z_][a-z0-9_-]{0,31}$").unwrap();
    static ref SYSTEM_PACKAGE_RE: Regex = Regex::new("^[a-z0-9][a-z0-9+.-]+$").unwrap();
}

/// The recipe configuration as it is deserialized, before any check was run on it
#[derive(Debug, Getters, CopyGetters, Deserialize)]
pub struct NotValidatedConfiguration {
    #[getset(get = "pub")]
    compatibility: semver::VersionReq,

    /// Every requirement in the manifest must carry a version constraint
    #[serde(default = "default_strict_pins")]
    #[getset(get_copy = "pub")]
    strict_pins: bool,

    #[getset(get = "pub")]
    image: ImageConfig,

    #[serde(default)]
    #[getset(get = "pub")]
    identity: IdentityConfig,

    #[serde(default)]
    #[getset(get = "pub")]
    entrypoint: EntrypointConfig,
}

impl NotValidatedConfiguration {
    pub fn validate(self) -> Result<Configuration> {
        let crate_version = semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .context("Parsing version of crate (CARGO_PKG_VERSION) into semver::Version object")?;

        if !self.compatibility.matches(&crate_version) {
            return Err(anyhow!("Configuration is not compatible to astrovastu {}", crate_version))
        }

        if !self.image.base().is_pinned() {
            return Err(BuildError::UnpinnedBaseImage {
                image: self.image.base().to_string(),
            })
            .context("Validating 'image.base'")
        }

        if !self.image.app_root().is_absolute() {
            return Err(anyhow!("Not an absolute path: image.app_root = {}", self.image.app_root().display()))
        }

        let reports = self.image.reports_dir();
        let reports_is_plain_relative = !reports.as_os_str().is_empty()
            && reports.components().all(|c| matches!(c, Component::Normal(_)));
        if !reports_is_plain_relative {
            return Err(anyhow!(
                "image.reports_dir must be a path below the application root, got '{}'",
                reports.display()
            ))
        }

        if let Some(pkg) = self.image.system_packages().iter().find(|p| !SYSTEM_PACKAGE_RE.is_match(p)) {
            return Err(anyhow!("Not a valid system package name: '{}'", pkg))
        }

        let user = self.identity.name();
        if !USER_NAME_RE.is_match(user) {
            return Err(anyhow!("Not a valid user name: identity.name = '{}'", user))
        }
        if user == "root" {
            return Err(anyhow!("identity.name must name an unprivileged account, not 'root'"))
        }
        if !self.identity.home().is_absolute() || !self.identity.shell().is_absolute() {
            return Err(anyhow!("identity.home and identity.shell must be absolute paths"))
        }

        self.entrypoint
            .check()
            .context("Validating 'entrypoint'")?;

        Ok(Configuration { inner: self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Configuration> {
        Configuration::from_toml(toml)
    }

    #[test]
    fn test_minimal_configuration_gets_defaults() {
        let config = parse(indoc::indoc!(r#"
            compatibility = ">=0.2"

            [image]
            base = "python:3.11-slim"
        "#)).unwrap();

        assert!(config.strict_pins());
        assert_eq!(config.image().app_root().display().to_string(), "/app");
        assert_eq!(config.reports_path().display().to_string(), "/app/reports");
        assert_eq!(config.identity().name(), "appuser");
        assert_eq!(config.identity().home().display().to_string(), "/home/appuser");
        assert_eq!(config.entrypoint().module(), "app.astro_service_with_dasha:app");
        assert_eq!(config.entrypoint().fallback_port(), 8000);
        assert_eq!(config.image().system_packages().len(), 5);
    }

    #[test]
    fn test_latest_base_image_is_refused() {
        let res = parse(indoc::indoc!(r#"
            compatibility = ">=0.2"

            [image]
            base = "python:latest"
        "#));

        let err = res.unwrap_err();
        assert!(err.chain().any(|e| e.to_string().contains("not pinned")));
    }

    #[test]
    fn test_incompatible_version_is_refused() {
        let res = parse(indoc::indoc!(r#"
            compatibility = ">=99"

            [image]
            base = "python:3.11-slim"
        "#));
        assert!(res.is_err());
    }

    #[test]
    fn test_root_identity_is_refused() {
        let res = parse(indoc::indoc!(r#"
            compatibility = ">=0.2"

            [image]
            base = "python:3.11-slim"

            [identity]
            name = "root"
        "#));
        assert!(res.is_err());
    }

    #[test]
    fn test_reports_dir_escaping_app_root_is_refused() {
        for bad in ["../reports", "/reports", ""] {
            let res = parse(&indoc::formatdoc!(r#"
                compatibility = ">=0.2"

                [image]
                base = "python:3.11-slim"
                reports_dir = "{}"
            "#, bad));
            assert!(res.is_err(), "accepted reports_dir = '{}'", bad);
        }
    }
}
