//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::PathBuf;

use clap::crate_authors;
use clap::crate_version;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;

use crate::util::EnvironmentVariableName;

pub fn cli() -> Command<'static> {
    Command::new("astrovastu")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Build recipe and runtime bootstrap for the Astro Vastu Pro service")
        .after_help(indoc::indoc!(r#"
            The image is built from one recipe, rendered with 'astrovastu render'.
            At container start, 'astrovastu launch' or 'astrovastu serve' checks the runtime
            environment before anything binds a port.

            Runtime configuration is read from the environment:

                PORT                      (8000)
                ASTROVASTU_HOST           (0.0.0.0)
                ASTROVASTU_APP_ROOT       (/app)
                ASTROVASTU_REPORTS_DIR    (<app root>/reports)
                ASTROVASTU_ENTRYPOINT     (app.astro_service_with_dasha:app)
                ASTROVASTU_IDENTITY_HOME  (/home/appuser)
                ASTROVASTU_PORT_ENV       (PORT), the variable the port is read from
                ASTROVASTU_FALLBACK_PORT  (8000)

            The image sets all of these from the recipe. Paths must be absolute.
        "#))
        .subcommand_required(true)
        .arg_required_else_help(true)

        .subcommand(Command::new("render")
            .about("Render the Dockerfile from the recipe configuration")
            .arg(arg_config())
            .arg(Arg::new("output")
                .required(false)
                .long("output")
                .short('o')
                .takes_value(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write the Dockerfile to PATH instead of stdout")
            )
        )

        .subcommand(Command::new("check")
            .about("Validate the recipe configuration and the dependency manifest")
            .arg(arg_config())
            .arg(Arg::new("context")
                .required(false)
                .long("context")
                .takes_value(true)
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Build context the manifest path is relative to (default: directory of the configuration file)")
            )
        )

        .subcommand(Command::new("preflight")
            .about("Check runtime identity, reports directory, entrypoint and port")
            .arg(Arg::new("skip_port")
                .required(false)
                .long("skip-port")
                .action(ArgAction::SetTrue)
                .help("Do not try to bind the port")
            )
        )

        .subcommand(Command::new("launch")
            .about("Run the preflight checks, then start the ASGI server in the foreground")
            .arg(Arg::new("server")
                .required(false)
                .long("server")
                .takes_value(true)
                .value_name("EXECUTABLE")
                .default_value(crate::consts::DEFAULT_SERVER)
                .value_parser(value_parser!(String))
                .help("The ASGI server executable")
            )
            .arg(Arg::new("env")
                .required(false)
                .long("env")
                .short('E')
                .takes_value(true)
                .action(ArgAction::Append)
                .value_name("KEY=VALUE")
                .value_parser(parse_env_arg)
                .help("Additional environment for the server process")
            )
            .arg(Arg::new("server_args")
                .required(false)
                .takes_value(true)
                .multiple_values(true)
                .last(true)
                .value_parser(value_parser!(String))
                .help("Further arguments for the server, after '--'")
            )
        )

        .subcommand(Command::new("serve")
            .about("Run the preflight checks, then serve the HTTP API natively")
        )
}

fn arg_config() -> Arg<'static> {
    Arg::new("config")
        .required(false)
        .long("config")
        .short('c')
        .takes_value(true)
        .value_name("PATH")
        .default_value(crate::consts::DEFAULT_CONFIG_FILE)
        .value_parser(value_parser!(PathBuf))
        .help("The recipe configuration file")
}

fn parse_env_arg(s: &str) -> Result<(EnvironmentVariableName, String), String> {
    crate::util::env::parse_to_env(s).map_err(|e| e.to_string())
}
