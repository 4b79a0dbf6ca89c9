//! `render` command.

use crate::error::Result;
use crate::packager::{Settings, parse_variable_args, render_templates};

/// Renders templates with variables taken from `--f:KEY=VALUE` arguments.
///
/// Templates that fail are logged by the renderer; the command still succeeds.
pub async fn run(settings: &Settings, raw_vars: &[String]) -> Result<i32> {
    let vars = parse_variable_args(raw_vars);
    let report = render_templates(settings.templates_dir(), settings.scripts_dir(), &vars).await?;

    if report.is_clean() {
        log::info!("Rendered {} template(s)", report.rendered.len());
    } else {
        log::warn!(
            "Rendered {} template(s), {} failed",
            report.rendered.len(),
            report.failed.len()
        );
    }

    Ok(0)
}
