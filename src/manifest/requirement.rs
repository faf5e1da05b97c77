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

use getset::{CopyGetters, Getters};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref REQUIREMENT_RE: Regex = Regex::new(
        r"^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<spec>[^\[\]]*)$"
    ).unwrap();

    static ref CONSTRAINT_RE: Regex = Regex::new(
        r"^(?P<op>===|==|~=|!=|>=|<=|>|<)\s*(?P<version>[A-Za-z0-9][A-Za-z0-9.*+!_-]*)$"
    ).unwrap();

    static ref EXTRA_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();

    static ref NAME_SEPARATOR_RE: Regex = Regex::new(r"[-_.]+").unwrap();
}

#[derive(parse_display::Display, Serialize, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
#[display("{0}")]
pub struct RequirementName(String);

impl Deref for RequirementName {
    type Target = String;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for RequirementName {
    fn from(s: String) -> Self {
        RequirementName(s)
    }
}

impl RequirementName {
    /// The name as the package index compares it: lowercase, separators folded to '-'
    pub fn normalized(&self) -> String {
        NAME_SEPARATOR_RE.replace_all(&self.0.to_lowercase(), "-").into_owned()
    }
}

#[derive(parse_display::Display, parse_display::FromStr, Serialize, Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ConstraintOp {
    #[display("===")]
    Arbitrary,
    #[display("==")]
    Exact,
    #[display("~=")]
    Compatible,
    #[display("!=")]
    Exclude,
    #[display(">=")]
    AtLeast,
    #[display("<=")]
    AtMost,
    #[display(">")]
    Greater,
    #[display("<")]
    Less,
}

#[derive(parse_display::Display, Serialize, Clone, Debug, Getters, CopyGetters, Hash, Eq, PartialEq)]
#[display("{op}{version}")]
pub struct VersionConstraint {
    #[getset(get_copy = "pub")]
    op: ConstraintOp,

    #[getset(get = "pub")]
    version: String,
}

/// One line of the dependency manifest
#[derive(Serialize, Clone, Debug, Getters, CopyGetters, Eq, PartialEq)]
pub struct Requirement {
    #[getset(get = "pub")]
    name: RequirementName,

    #[getset(get = "pub")]
    extras: Vec<String>,

    #[getset(get = "pub")]
    constraints: Vec<VersionConstraint>,

    /// The line in the manifest, starting at 1
    #[getset(get_copy = "pub")]
    line: usize,
}

impl Requirement {
    /// Parse the requirement part of a manifest line
    ///
    /// Comments and environment markers must already be stripped. Returns None if the text is
    /// not a requirement we understand.
    pub fn parse(text: &str, line: usize) -> Option<Self> {
        let caps = REQUIREMENT_RE.captures(text.trim())?;
        let name = RequirementName::from(caps.name("name")?.as_str().to_string());

        let extras = match caps.name("extras") {
            None => Vec::new(),
            Some(m) => {
                let extras = m.as_str()
                    .split(',')
                    .map(str::trim)
                    .map(String::from)
                    .collect::<Vec<_>>();

                if extras.iter().any(|e| !EXTRA_RE.is_match(e)) {
                    return None
                }
                extras
            }
        };

        let spec = caps.name("spec").map(|m| m.as_str().trim()).unwrap_or_default();
        let constraints = if spec.is_empty() {
            Vec::new()
        } else {
            spec.split(',')
                .map(str::trim)
                .map(|c| {
                    let caps = CONSTRAINT_RE.captures(c)?;
                    Some(VersionConstraint {
                        op: caps.name("op")?.as_str().parse().ok()?,
                        version: caps.name("version")?.as_str().to_string(),
                    })
                })
                .collect::<Option<Vec<_>>>()?
        };

        Some(Requirement {
            name,
            extras,
            constraints,
            line,
        })
    }

    pub fn is_pinned(&self) -> bool {
        !self.constraints.is_empty()
    }

    /// Pinned to exactly one version with `==` or `===`
    pub fn is_exact(&self) -> bool {
        self.constraints.len() == 1
            && matches!(self.constraints[0].op(), ConstraintOp::Exact | ConstraintOp::Arbitrary)
            && !self.constraints[0].version().contains('*')
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.iter().join(","))?;
        }
        write!(f, "{}", self.constraints.iter().join(","))
    }
}
