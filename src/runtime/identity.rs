//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use getset::{CopyGetters, Getters};
use nix::unistd::Uid;
use nix::unistd::User;
use tracing::debug;

use crate::error::StartupError;

/// The identity the process executes as
#[derive(Clone, Debug, Getters, CopyGetters)]
pub struct RuntimeIdentity {
    #[getset(get_copy = "pub")]
    uid: u32,

    #[getset(get = "pub")]
    name: Option<String>,
}

impl RuntimeIdentity {
    /// Inspect the effective identity of the current process
    pub fn current() -> Self {
        let uid = Uid::effective();
        let name = match User::from_uid(uid) {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                debug!("Looking up user name for uid {} failed: {}", uid, e);
                None
            }
        };

        RuntimeIdentity {
            uid: uid.as_raw(),
            name,
        }
    }

    #[cfg(test)]
    pub fn new(uid: u32, name: Option<String>) -> Self {
        RuntimeIdentity { uid, name }
    }

    pub fn is_privileged(&self) -> bool {
        Uid::from_raw(self.uid).is_root()
    }

    /// Fail if this is the privileged build-time identity
    pub fn ensure_unprivileged(&self) -> Result<(), StartupError> {
        if self.is_privileged() {
            return Err(StartupError::PrivilegedIdentity { uid: self.uid });
        }
        Ok(())
    }
}

impl std::fmt::Display for RuntimeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name.as_ref() {
            Some(name) => write!(f, "{} (uid {})", name, self.uid),
            None => write!(f, "uid {}", self.uid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_refused() {
        let root = RuntimeIdentity::new(0, Some(String::from("root")));
        assert!(root.is_privileged());
        assert!(matches!(
            root.ensure_unprivileged(),
            Err(StartupError::PrivilegedIdentity { uid: 0 })
        ));
    }

    #[test]
    fn test_unprivileged_is_accepted() {
        let user = RuntimeIdentity::new(1000, Some(String::from("appuser")));
        assert!(user.ensure_unprivileged().is_ok());
        assert_eq!(user.to_string(), "appuser (uid 1000)");
    }

    #[test]
    fn test_current_reports_effective_uid() {
        let current = RuntimeIdentity::current();
        assert_eq!(current.uid(), Uid::effective().as_raw());
    }
}
