//! `sites` command

use std::path::Path;

use anyhow::{Context, Result};
use fleek_iterative_deploy::config::{Config, Credentials};
use fleek_iterative_deploy::infrastructure::FleekClientConfig;
use fleek_iterative_deploy::presentation::{create_deploy_use_case, create_event_sink};

use super::report_config_warnings;

pub fn cmd_sites(config_path: Option<&Path>, json: bool, verbose: u8) -> Result<()> {
    let root = std::env::current_dir().context("failed to read the current directory")?;
    let (config, warnings) = Config::load_layered(&root, config_path)?;
    report_config_warnings(&warnings);

    let credentials = Credentials::from_env()?;
    let api = FleekClientConfig::new(credentials.api_key.clone())
        .with_api_url(config.fleek.api_url.clone());
    let use_case = create_deploy_use_case(&root, api, create_event_sink(json, verbose))?;

    let sites = use_case.list_team_sites(&credentials.team_id)?;

    if json {
        println!("{}", serde_json::to_string(&sites)?);
        return Ok(());
    }

    if sites.is_empty() {
        println!("No sites found for team {}", credentials.team_id);
        return Ok(());
    }
    for site in &sites {
        match &site.slug {
            Some(slug) => println!("{}  {} ({})", site.id, site.name, slug),
            None => println!("{}  {}", site.id, site.name),
        }
    }
    Ok(())
}
