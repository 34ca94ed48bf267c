// SPDX-License-Identifier: MIT OR Apache-2.0
//! `NodeLogic` command line host.
//!
//! Compiles editor blueprints into runtime graph documents and drives the
//! propagation engine from the terminal. Log output goes to stderr and is
//! controlled with `RUST_LOG`.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::CliArguments;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("nodelogic_cli=info".parse()?)
        .add_directive("nodelogic_graph=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting nodelogic v{}", env!("CARGO_PKG_VERSION"));

    match CliArguments::parse() {
        CliArguments::Compile(args) => commands::compile_main(args),
        CliArguments::Run(args) => commands::run_main(args),
        CliArguments::Check(args) => commands::check_main(args),
    }
}
