//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

/// The environment variable the hosting platform uses to hand us a port
pub const PORT_ENV: &str = "PORT";

/// The port we bind to if `PORT` is not set
pub const DEFAULT_PORT: u16 = 8000;

/// All interfaces
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The path inside the image where the source tree and the application package live
pub const DEFAULT_APP_ROOT: &str = "/app";

/// Name of the reports directory, relative to the application root
pub const REPORTS_DIR_NAME: &str = "reports";

/// The canonical ASGI application object, resolved through `PYTHONPATH=<app root>`
pub const DEFAULT_ENTRYPOINT: &str = "app.astro_service_with_dasha:app";

pub const DEFAULT_SERVER: &str = "uvicorn";

pub const DEFAULT_IDENTITY_NAME: &str = "appuser";
pub const DEFAULT_IDENTITY_SHELL: &str = "/bin/bash";

pub const ENV_HOST: &str = "ASTROVASTU_HOST";
pub const ENV_APP_ROOT: &str = "ASTROVASTU_APP_ROOT";
pub const ENV_REPORTS_DIR: &str = "ASTROVASTU_REPORTS_DIR";
pub const ENV_ENTRYPOINT: &str = "ASTROVASTU_ENTRYPOINT";
pub const ENV_IDENTITY_HOME: &str = "ASTROVASTU_IDENTITY_HOME";

/// Names the variable the port is read from, `PORT` if unset
pub const ENV_PORT_ENV: &str = "ASTROVASTU_PORT_ENV";
pub const ENV_FALLBACK_PORT: &str = "ASTROVASTU_FALLBACK_PORT";

/// The recipe configuration file that is loaded if `--config` is not passed
pub const DEFAULT_CONFIG_FILE: &str = "astrovastu.toml";

/// Prefix for environment variables overriding recipe configuration keys
pub const RECIPE_ENV_PREFIX: &str = "ASTROVASTU_RECIPE";

/// The only supported worker count
pub const WORKERS: u16 = 1;
