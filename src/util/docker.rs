//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use serde::Deserialize;
use serde::Serialize;

/// A container image reference, e.g. `python:3.11-slim` or `registry:5000/python@sha256:...`
#[derive(
    parse_display::Display,
    Serialize,
    Deserialize,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
#[serde(transparent)]
#[display("{0}")]
pub struct ImageName(String);

impl From<String> for ImageName {
    fn from(s: String) -> Self {
        ImageName(s)
    }
}

#[cfg(test)]
impl From<&str> for ImageName {
    fn from(s: &str) -> Self {
        ImageName(String::from(s))
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl ImageName {
    /// The digest part of the reference (after '@'), if any
    pub fn digest(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, digest)| digest)
    }

    /// The tag of the reference, if any
    ///
    /// A ':' before the last '/' belongs to a registry port, not to a tag.
    pub fn tag(&self) -> Option<&str> {
        let without_digest = self.0.split('@').next().unwrap_or_default();
        let last_component = without_digest.rsplit('/').next().unwrap_or_default();
        last_component
            .split_once(':')
            .map(|(_, tag)| tag)
            .filter(|tag| !tag.is_empty())
    }

    /// Whether this reference names one specific runtime version
    ///
    /// A digest always pins. A tag pins unless it is `latest`.
    pub fn is_pinned(&self) -> bool {
        if self.digest().map(|d| !d.is_empty()).unwrap_or(false) {
            return true;
        }

        self.tag().map(|t| t != "latest").unwrap_or(false)
    }
}
