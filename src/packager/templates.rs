//! Deployment script rendering.
//!
//! Renders every `*.template` file in the templates directory with Handlebars
//! and writes the result, suffix stripped, into the scripts directory.
//! Unknown placeholders render as empty strings. A template that fails to
//! render is recorded in the [`RenderReport`] and the batch continues.

use crate::packager::{
    error::{Error, ErrorExt, Result},
    settings::TEMPLATE_SUFFIX,
};
use handlebars::Handlebars;
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

/// Prefix of a template variable argument: `--f:KEY=VALUE`.
pub const VARIABLE_ARG_PREFIX: &str = "--f:";

/// Template variables; a later assignment of the same key wins.
pub type TemplateVariables = BTreeMap<String, String>;

/// Parses `--f:KEY=VALUE` arguments into variables.
///
/// Arguments that do not match the pattern, or that have an empty key, are
/// logged and skipped.
pub fn parse_variable_args<S: AsRef<str>>(args: &[S]) -> TemplateVariables {
    let mut vars = TemplateVariables::new();

    for arg in args {
        let arg = arg.as_ref();
        let parsed = arg
            .strip_prefix(VARIABLE_ARG_PREFIX)
            .and_then(|rest| rest.split_once('='))
            .filter(|(key, _)| !key.trim().is_empty());

        match parsed {
            Some((key, value)) => {
                log::debug!("Template variable {} = {:?}", key, value);
                vars.insert(key.trim().to_string(), value.to_string());
            }
            None => log::warn!(
                "Skipping malformed argument {:?} (expected {}KEY=VALUE)",
                arg,
                VARIABLE_ARG_PREFIX
            ),
        }
    }

    vars
}

/// Outcome of a render pass.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Files written to the output directory.
    pub rendered: Vec<PathBuf>,
    /// Templates that could not be rendered, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
}

impl RenderReport {
    /// Whether every template rendered.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders all templates in `templates_dir` into `output_dir`.
///
/// A missing `templates_dir` is treated as an empty batch. Only failing to
/// list the directory or create `output_dir` aborts the pass.
pub async fn render_templates(
    templates_dir: &Path,
    output_dir: &Path,
    vars: &TemplateVariables,
) -> Result<RenderReport> {
    let mut report = RenderReport::default();

    let templates = match list_templates(templates_dir).await {
        Ok(templates) => templates,
        Err(Error::Fs { error, .. }) if error.kind() == io::ErrorKind::NotFound => {
            log::info!(
                "Template directory {} does not exist, nothing to render",
                templates_dir.display()
            );
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    if templates.is_empty() {
        log::info!("No templates found in {}", templates_dir.display());
        return Ok(report);
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .fs_context("creating template output directory", output_dir)?;

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    for (template_path, output_name) in templates {
        let output_path = output_dir.join(&output_name);
        match render_one(&handlebars, &template_path, &output_path, vars).await {
            Ok(()) => {
                log::info!(
                    "Rendered {} -> {}",
                    template_path.display(),
                    output_path.display()
                );
                report.rendered.push(output_path);
            }
            Err(e) => {
                log::error!("Failed to render {}: {}", template_path.display(), e);
                report.failed.push((template_path, e));
            }
        }
    }

    Ok(report)
}

/// Lists `(template path, output file name)` pairs, sorted by path.
async fn list_templates(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("reading template directory", dir)?;

    let mut templates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading template directory", dir)?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .fs_context("reading file type", &path)?;
        if !file_type.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name {}", path.display());
            continue;
        };

        match name.strip_suffix(TEMPLATE_SUFFIX) {
            Some("") => log::warn!("Skipping {}: empty output name", path.display()),
            Some(stem) => {
                let stem = stem.to_string();
                templates.push((path, stem));
            }
            None => log::debug!("Ignoring non-template file {}", path.display()),
        }
    }

    templates.sort();
    Ok(templates)
}

async fn render_one(
    handlebars: &Handlebars<'_>,
    template_path: &Path,
    output_path: &Path,
    vars: &TemplateVariables,
) -> Result<()> {
    let source = tokio::fs::read_to_string(template_path)
        .await
        .fs_context("reading template", template_path)?;

    let rendered = handlebars
        .render_template(&source, vars)
        .map_err(|e| Error::Template {
            path: template_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(output_path, rendered)
        .await
        .fs_context("writing rendered template", output_path)
}
