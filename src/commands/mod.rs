//! Command handlers for the binary

mod deploy;
mod sites;

pub use deploy::cmd_deploy;
pub use sites::cmd_sites;

use fleek_iterative_deploy::config::ConfigWarning;

/// Config warnings go to stderr so they never mix with NDJSON on stdout
fn report_config_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}
