//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--json, --verbose, --config) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fleek-iterative-deploy - deploy large static sites to Fleek in chunks
#[derive(Parser, Debug)]
#[command(name = "fleek-iterative-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events instead of human-readable progress
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v shows file lists and poll attempts)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of .fleek-deploy.toml / the user config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the site and push changed files to the deploy branch in chunks
    Deploy(DeployArgs),

    /// List the sites owned by FLEEK_TEAM_ID
    Sites,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Command that builds the site (default: npm run build)
    pub build_command: Option<String>,

    /// Build output directory, relative to the checkout (default: build)
    pub public_dir: Option<PathBuf>,

    /// Branch Fleek deploys from (default: FLEEK_ITERATIVE_DEPLOY)
    pub deploy_branch: Option<String>,

    /// Show the resolved inputs without touching git
    #[arg(long)]
    pub dry_run: bool,

    /// Split uploads by file count
    #[arg(long, value_name = "N", conflicts_with = "max_bytes")]
    pub files_per_upload: Option<usize>,

    /// Split uploads by cumulative size in bytes
    #[arg(long, value_name = "N")]
    pub max_bytes: Option<u64>,
}
