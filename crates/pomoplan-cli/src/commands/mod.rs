pub mod config;
pub mod plan;
pub mod timer;

use pomoplan_core::{Config, PomodoroFormat};

/// Resolve `--format` (or the configured default) and check `--total`
/// against the options offered for that format.
pub fn resolve_choice(
    config: &Config,
    format: Option<&str>,
    total: u32,
) -> Result<(PomodoroFormat, u32), Box<dyn std::error::Error>> {
    let format = config.resolve_format(format)?;
    let total = format.validate_total(total)?;
    Ok((format, total))
}
