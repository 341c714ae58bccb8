//! fleek-iterative-deploy CLI
//!
//! Usage: fleek-iterative-deploy <COMMAND>
//!
//! Commands:
//!   deploy  Build the site and push changed files to the deploy branch in chunks
//!   sites   List the sites of the Fleek team

mod commands;

use anyhow::Result;
use clap::Parser;
use fleek_iterative_deploy::presentation::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Deploy(args) => commands::cmd_deploy(args, config_path, cli.json, cli.verbose),
        Commands::Sites => commands::cmd_sites(config_path, cli.json, cli.verbose),
    }
}
