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
use std::process::ExitStatus;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use itertools::Itertools;
use nix::sys::signal::kill;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::config::EntrypointConfig;
use crate::config::RuntimeConfig;
use crate::error::BuildError;
use crate::runtime::entrypoint::ModuleSpec;
use crate::util::EnvironmentVariableName;

/// How the server learns its port
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PortArg {
    /// Read by the shell at container start, `${ENV:-fallback}`
    Deferred { env: String, fallback: u16 },

    /// Already read from the environment by us
    Fixed(u16),
}

impl std::fmt::Display for PortArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortArg::Deferred { env, fallback } => write!(f, "${{{env}:-{fallback}}}"),
            PortArg::Fixed(port) => write!(f, "{port}"),
        }
    }
}

/// The one launch command of the service
///
/// Both the image's `CMD` and the `launch` subcommand are derived from this type, so they cannot
/// drift apart.
#[derive(Clone, Debug, Getters)]
pub struct LaunchCommand {
    #[getset(get = "pub")]
    server: String,

    #[getset(get = "pub")]
    module: ModuleSpec,

    #[getset(get = "pub")]
    host: String,

    #[getset(get = "pub")]
    port: PortArg,

    workers: u16,

    extra_args: Vec<String>,
}

impl LaunchCommand {
    /// The command baked into the image, the port is resolved at container start
    pub fn for_image(entrypoint: &EntrypointConfig) -> Result<Self, BuildError> {
        Ok(LaunchCommand {
            server: entrypoint.server().clone(),
            module: entrypoint.module_spec()?,
            host: String::from(crate::consts::DEFAULT_HOST),
            port: PortArg::Deferred {
                env: entrypoint.port_env().clone(),
                fallback: entrypoint.fallback_port(),
            },
            workers: entrypoint.workers(),
            extra_args: entrypoint.server_args().clone(),
        })
    }

    /// The command for this process, with the port taken from the runtime configuration
    pub fn for_runtime(config: &RuntimeConfig, server: &str, extra_args: Vec<String>) -> Self {
        LaunchCommand {
            server: server.to_string(),
            module: config.entrypoint().clone(),
            host: config.host().clone(),
            port: PortArg::Fixed(config.port()),
            workers: crate::consts::WORKERS,
            extra_args,
        }
    }

    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![
            self.server.clone(),
            self.module.to_string(),
            String::from("--host"),
            self.host.clone(),
            String::from("--port"),
            self.port.to_string(),
            String::from("--workers"),
            self.workers.to_string(),
        ];
        argv.extend(self.extra_args.iter().cloned());
        argv
    }

    /// The command as one line for `sh -c`
    ///
    /// Arguments are not quoted, a deferred port must stay expandable by the shell.
    pub fn shell_line(&self) -> String {
        self.argv().iter().join(" ")
    }

    /// The environment the server process gets on top of the inherited one
    pub fn environment(config: &RuntimeConfig, app_root: &Path) -> Vec<(EnvironmentVariableName, String)> {
        let mut env = vec![
            (EnvironmentVariableName::from("PYTHONPATH"), app_root.display().to_string()),
            (EnvironmentVariableName::from("PATH"), config.child_search_path()),
        ];

        if config.unbuffered() {
            env.push((EnvironmentVariableName::from("PYTHONUNBUFFERED"), String::from("1")));
        }

        env
    }

    /// Run the server in the foreground until it exits
    ///
    /// The child runs in `app_root`. There is no restart, that is left to the platform.
    pub async fn run(
        &self,
        config: &RuntimeConfig,
        app_root: &Path,
        additional_env: &[(EnvironmentVariableName, String)],
    ) -> Result<ExitStatus> {
        let argv = self.argv();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| anyhow!("Empty launch command"))?;

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(app_root).kill_on_drop(true);

        for (k, v) in Self::environment(config, app_root).iter().chain(additional_env.iter()) {
            trace!("Setting {}={}", k, v);
            cmd.env(k.as_ref(), v);
        }

        info!("Launching: {}", self.shell_line());
        let mut child = cmd
            .spawn()
            .with_context(|| anyhow!("Spawning '{}'", program))?;

        // as PID 1 of the container we receive the platform's stop signal, the server does not
        let pid = child.id().map(|id| Pid::from_raw(id as i32));
        let mut terminate = signal(SignalKind::terminate()).context("Installing SIGTERM handler")?;
        let mut interrupt = signal(SignalKind::interrupt()).context("Installing SIGINT handler")?;

        loop {
            tokio::select! {
                status = child.wait() => {
                    return status.with_context(|| anyhow!("Waiting for '{}'", program));
                }
                Some(()) = terminate.recv() => forward(pid, Signal::SIGTERM),
                Some(()) = interrupt.recv() => forward(pid, Signal::SIGINT),
            }
        }
    }
}

fn forward(pid: Option<Pid>, sig: Signal) {
    match pid {
        Some(pid) => {
            info!("Forwarding {} to {}", sig, pid);
            if let Err(e) = kill(pid, sig) {
                warn!("Forwarding {} to {} failed: {}", sig, pid, e);
            }
        }
        None => debug!("Not forwarding {}, the server already exited", sig),
    }
}
