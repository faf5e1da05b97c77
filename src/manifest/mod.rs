//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The dependency manifest, a flat `requirements.txt`
//!
//! It is consumed once, at image build time.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use getset::Getters;
use tracing::debug;
use tracing::trace;

use crate::error::BuildError;

mod requirement;
pub use requirement::*;

#[derive(Debug, Getters)]
pub struct Manifest {
    #[getset(get = "pub")]
    path: PathBuf,

    #[getset(get = "pub")]
    requirements: Vec<Requirement>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.is_file() {
            return Err(BuildError::MissingManifest {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            debug!("Reading {} failed: {}", path.display(), e);
            BuildError::MissingManifest {
                path: path.to_path_buf(),
            }
        })?;

        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, BuildError> {
        let mut requirements = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let text = strip_line(raw);
            if text.is_empty() {
                continue;
            }

            let malformed = || BuildError::MalformedRequirement {
                path: path.to_path_buf(),
                line,
                content: raw.to_string(),
            };

            // options like "-r other.txt" or "--index-url" make the manifest non-flat
            if text.starts_with('-') {
                return Err(malformed());
            }

            let req = Requirement::parse(text, line).ok_or_else(malformed)?;
            trace!("Parsed requirement: {}", req);

            if let Some(first) = seen.insert(req.name().normalized(), line) {
                return Err(BuildError::DuplicateRequirement {
                    name: req.name().to_string(),
                    first,
                    second: line,
                });
            }

            requirements.push(req);
        }

        debug!("Loaded {} requirements from {}", requirements.len(), path.display());
        Ok(Manifest {
            path: path.to_path_buf(),
            requirements,
        })
    }

    pub fn unpinned(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| !r.is_pinned())
    }

    /// Fail on the first requirement without a version constraint
    pub fn ensure_pinned(&self) -> Result<(), BuildError> {
        match self.unpinned().next() {
            Some(r) => Err(BuildError::UnpinnedRequirement {
                name: r.name().to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Remove comments and environment markers
fn strip_line(raw: &str) -> &str {
    let without_comment = if raw.trim_start().starts_with('#') {
        ""
    } else {
        match raw.find(" #").or_else(|| raw.find("\t#")) {
            Some(pos) => &raw[..pos],
            None => raw,
        }
    };

    without_comment
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
