//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::Path;
use std::path::PathBuf;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::error::BuildError;
use crate::error::StartupError;

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// An ASGI application reference: `dotted.module.path:attribute`
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ModuleSpec {
    module: Vec<String>,
    attribute: String,
}

impl ModuleSpec {
    pub fn parse(s: &str) -> Result<Self, BuildError> {
        let invalid = |reason: &str| BuildError::InvalidEntrypoint {
            entrypoint: s.to_string(),
            reason: reason.to_string(),
        };

        let (module, attribute) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected 'module.path:attribute'"))?;

        if attribute.contains(':') {
            return Err(invalid("more than one ':'"));
        }

        if !IDENTIFIER_RE.is_match(attribute) {
            return Err(invalid("attribute is not an identifier"));
        }

        let module = module.split('.').map(String::from).collect::<Vec<_>>();
        if module.iter().any(|part| !IDENTIFIER_RE.is_match(part)) {
            return Err(invalid("module path is not a dotted sequence of identifiers"));
        }

        Ok(ModuleSpec {
            module,
            attribute: attribute.to_string(),
        })
    }

    /// `a.b` for `a.b:app`
    pub fn module_path(&self) -> String {
        self.module.iter().join(".")
    }

    #[cfg(test)]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The files that may implement the module, relative to an import root
    pub fn candidates(&self, root: &Path) -> [PathBuf; 2] {
        let mut base = root.to_path_buf();
        for part in &self.module {
            base.push(part);
        }

        [base.with_extension("py"), base.join("__init__.py")]
    }

    /// Resolve the module below `root`
    ///
    /// The result depends on `root` only, never on the current working directory.
    pub fn resolve(&self, root: &Path) -> Result<PathBuf, StartupError> {
        let unresolvable = || StartupError::UnresolvableEntrypoint {
            module: self.to_string(),
            root: root.to_path_buf(),
        };

        if !root.is_absolute() {
            return Err(unresolvable());
        }

        self.candidates(root)
            .into_iter()
            .inspect(|candidate| trace!("Looking for entrypoint module at {}", candidate.display()))
            .find(|candidate| candidate.is_file())
            .ok_or_else(unresolvable)
    }
}

impl std::fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.module_path(), self.attribute)
    }
}
