//! `deploy` command

use std::path::Path;

use anyhow::{Context, Result};
use fleek_iterative_deploy::application::DeployOptions;
use fleek_iterative_deploy::config::{
    require_env, Config, PartitionStrategy, API_KEY_ENV, CI_REF_ENV, SITE_ID_ENV,
};
use fleek_iterative_deploy::infrastructure::FleekClientConfig;
use fleek_iterative_deploy::presentation::{
    create_deploy_use_case, create_event_sink, DeployArgs,
};

use super::report_config_warnings;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// CLI arguments take precedence over config and environment
fn apply_cli_overrides(config: &mut Config, args: &DeployArgs) {
    if let Some(command) = &args.build_command {
        config.deploy.build_command = command.clone();
    }
    if let Some(dir) = &args.public_dir {
        config.deploy.public_dir = dir.clone();
    }
    if let Some(branch) = &args.deploy_branch {
        config.deploy.branch = branch.clone();
    }
    if let Some(files) = args.files_per_upload {
        config.deploy.partition.files_per_upload = files;
        config.deploy.partition.strategy = PartitionStrategy::Files;
    }
    if let Some(bytes) = args.max_bytes {
        config.deploy.partition.max_bytes = bytes;
        config.deploy.partition.strategy = PartitionStrategy::Bytes;
    }
}

fn print_dry_run(options: &DeployOptions, json: bool) {
    if json {
        let event = serde_json::json!({
            "event": "dry_run",
            "root": options.root.display().to_string(),
            "build_command": options.build_command,
            "public_dir": options.public_dir_pattern(),
            "deploy_branch": options.deploy_branch,
            "remote": options.remote,
            "partition": options.partition.to_string(),
            "ci_ref": options.ci_ref,
            "site_id": options.site_id,
        });
        println!("{}", event);
        return;
    }

    println!("Dry run, nothing will be built or pushed");
    println!("  checkout:      {}", options.root.display());
    println!("  build command: {}", options.build_command);
    println!("  public dir:    {}", options.public_dir_path().display());
    println!("  deploy branch: {} (remote {})", options.deploy_branch, options.remote);
    println!("  uploads:       {}", options.partition);
    println!(
        "  trigger ref:   {}",
        options.ci_ref.as_deref().unwrap_or("current branch")
    );
    println!(
        "  site:          {}",
        if options.site_id.is_empty() {
            "<FLEEK_SITE_ID not set>"
        } else {
            options.site_id.as_str()
        }
    );
}

pub fn cmd_deploy(
    args: &DeployArgs,
    config_path: Option<&Path>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let root = std::env::current_dir().context("failed to read the current directory")?;

    let (mut config, warnings) = Config::load_layered(&root, config_path)?;
    report_config_warnings(&warnings);
    apply_cli_overrides(&mut config, args);

    let ci_ref = env_var(CI_REF_ENV).filter(|r| !r.trim().is_empty());

    if args.dry_run {
        let site_id = env_var(SITE_ID_ENV).unwrap_or_default();
        let options = config.deploy_options(&root, site_id, ci_ref)?;
        print_dry_run(&options, json);
        return Ok(());
    }

    let api_key = require_env(env_var, API_KEY_ENV)?;
    let site_id = require_env(env_var, SITE_ID_ENV)?;
    let options = config.deploy_options(&root, site_id, ci_ref)?;

    let events = create_event_sink(json, verbose);
    let api = FleekClientConfig::new(api_key).with_api_url(config.fleek.api_url.clone());
    let use_case = create_deploy_use_case(&root, api, events)?;

    use_case
        .deploy_iteratively(&options)
        .with_context(|| format!("deploy to branch '{}' failed", options.deploy_branch))?;
    Ok(())
}
