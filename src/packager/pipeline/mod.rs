//! Win32 app packaging pipeline.
//!
//! Stages an installer and its sibling files next to the rendered deployment
//! scripts, runs the packaging tool over the staging root, then moves the
//! produced `.intunewin` next to a zip of everything that was staged.
//!
//! # Process
//!
//! 1. Create `<staging parent>/intunewin-stage-<uuid>`
//! 2. Copy the input to `Files/app.<ext>` and its siblings into `Files/`
//! 3. Copy the deployment scripts directory into the root
//! 4. Run `<tool> -c <root> -s <scripts>/<install script> -o <root> -q`
//! 5. Verify `<root>/<install script stem>.intunewin` exists
//! 6. Move it to `<output dir>/<input stem>.intunewin`
//! 7. Zip the root to `<output dir>/<input stem>_source.zip`
//! 8. Remove the root, on success and on failure

mod staging;

pub use staging::{StagingDir, canonical_name, parent_dir};

use crate::packager::{
    archive,
    error::{Context, Error, Result},
    runner::CommandRunner,
    settings::{ARTIFACT_EXTENSION, SOURCE_ZIP_SUFFIX, Settings},
    utils::fs,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Final locations of the two pipeline outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// The packaged `.intunewin` archive.
    pub intunewin: PathBuf,
    /// Zip of the staged inputs.
    pub source_zip: PathBuf,
}

impl ArtifactPaths {
    /// Derives output paths from the input's file stem.
    ///
    /// Without an explicit `output_dir` the input's own directory is used.
    pub fn for_input(input: &Path, output_dir: Option<&Path>) -> Result<Self> {
        let stem = input
            .file_stem()
            .with_context(|| format!("{} has no file name", input.display()))?
            .to_string_lossy()
            .into_owned();
        let dir = output_dir.unwrap_or_else(|| parent_dir(input));

        Ok(Self {
            intunewin: dir.join(format!("{stem}.{ARTIFACT_EXTENSION}")),
            source_zip: dir.join(format!("{stem}{SOURCE_ZIP_SUFFIX}")),
        })
    }
}

/// Packages `input` with the tool at [`Settings::tool_path`].
///
/// The staging directory is removed before this returns, whatever the outcome.
pub async fn package<R: CommandRunner>(
    runner: &R,
    settings: &Settings,
    input: &Path,
    output_dir: Option<&Path>,
) -> Result<ArtifactPaths> {
    if !input.is_file() {
        crate::bail!(
            "input package {} does not exist or is not a file",
            input.display()
        );
    }
    let paths = ArtifactPaths::for_input(input, output_dir)?;

    log::info!("Packaging {}", input.display());

    let staging = StagingDir::create(settings.staging_parent()).await?;
    let result = build_in_staging(runner, settings, &staging, input, &paths).await;
    staging.remove().await;

    match &result {
        Ok(paths) => {
            log::info!("✓ Created {}", paths.intunewin.display());
            log::info!("✓ Created {}", paths.source_zip.display());
        }
        Err(e) => log::error!("Packaging {} failed: {}", input.display(), e),
    }

    result
}

async fn build_in_staging<R: CommandRunner>(
    runner: &R,
    settings: &Settings,
    staging: &StagingDir,
    input: &Path,
    paths: &ArtifactPaths,
) -> Result<ArtifactPaths> {
    staging.stage_application(input).await?;

    let scripts = staging
        .stage_scripts(settings.scripts_dir(), settings.scripts_dir_name())
        .await?;
    if !scripts.join(settings.install_script()).is_file() {
        log::warn!(
            "{} is missing from {}; the packaging tool will likely fail",
            settings.install_script(),
            settings.scripts_dir().display()
        );
    }

    let root = staging.root();
    let args: Vec<OsString> = vec![
        "-c".into(),
        root.as_os_str().to_owned(),
        "-s".into(),
        settings.setup_file_relative().into_os_string(),
        "-o".into(),
        root.as_os_str().to_owned(),
        "-q".into(),
    ];

    log::info!("Running {}", settings.tool_path().display());
    let out = runner.run(settings.tool_path(), &args).await?;
    if !out.output.trim().is_empty() {
        log::debug!("Packaging tool output:\n{}", out.output.trim_end());
    }
    if !out.success() {
        log::warn!("Packaging tool exited with {:?}", out.code);
    }

    let produced = root.join(settings.expected_artifact_name());
    if !produced.is_file() {
        return Err(Error::ArtifactMissing {
            expected: produced,
            output: out.output,
        });
    }

    fs::move_file(&produced, &paths.intunewin).await?;

    let (src, dest) = (root.to_path_buf(), paths.source_zip.clone());
    let entries = tokio::task::spawn_blocking(move || archive::zip_dir(&src, &dest))
        .await
        .map_err(|e| Error::GenericError(format!("source zip task panicked: {e}")))??;
    log::debug!("Source zip holds {} entries", entries);

    Ok(paths.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::{
        archive::tests::entry_names,
        runner::CommandOutput,
        settings::SettingsBuilder,
    };
    use std::sync::Mutex;

    /// Stands in for the packaging tool: writes `<-o>/<stem of -s>.intunewin`.
    #[derive(Default)]
    struct FakePackager {
        produce: bool,
        exit_code: i32,
        calls: Mutex<Vec<Vec<OsString>>>,
    }

    impl FakePackager {
        fn producing() -> Self {
            Self {
                produce: true,
                ..Default::default()
            }
        }
    }

    fn arg_after<'a>(args: &'a [OsString], flag: &str) -> &'a OsString {
        let pos = args.iter().position(|a| a == flag).unwrap();
        &args[pos + 1]
    }

    impl CommandRunner for FakePackager {
        async fn run(&self, _program: &Path, args: &[OsString]) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            if !self.produce {
                return Ok(CommandOutput {
                    code: Some(1),
                    output: "ERROR: setup file not found".into(),
                });
            }
            let out_dir = PathBuf::from(arg_after(args, "-o"));
            let setup = PathBuf::from(arg_after(args, "-s"));
            let stem = setup.file_stem().unwrap().to_string_lossy().into_owned();
            std::fs::write(out_dir.join(format!("{stem}.intunewin")), "packaged").unwrap();
            Ok(CommandOutput {
                code: Some(self.exit_code),
                output: "Done!!!".into(),
            })
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: PathBuf,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path().to_path_buf();
            std::fs::create_dir_all(root.join("in/lang")).unwrap();
            std::fs::write(root.join("in/Contoso Setup.msi"), "msi-bytes").unwrap();
            std::fs::write(root.join("in/config.json"), "{}").unwrap();
            std::fs::write(root.join("in/lang/en.mst"), "mst").unwrap();
            std::fs::create_dir_all(root.join("deploy")).unwrap();
            std::fs::write(root.join("deploy/install.ps1"), "msiexec /i app.msi").unwrap();
            std::fs::create_dir_all(root.join("staging")).unwrap();

            let settings = SettingsBuilder::new()
                .scripts_dir(root.join("deploy"))
                .staging_parent(root.join("staging"))
                .tool_path(root.join("tools/IntuneWinAppUtil.exe"))
                .build()
                .unwrap();

            Self {
                _tmp: tmp,
                root,
                settings,
            }
        }

        fn input(&self) -> PathBuf {
            self.root.join("in/Contoso Setup.msi")
        }

        fn staging_is_empty(&self) -> bool {
            std::fs::read_dir(self.root.join("staging"))
                .unwrap()
                .next()
                .is_none()
        }
    }

    #[test]
    fn artifact_paths_follow_input_stem() {
        let paths = ArtifactPaths::for_input(Path::new("/pkgs/Widget 2.1.exe"), None).unwrap();
        assert_eq!(paths.intunewin, Path::new("/pkgs/Widget 2.1.intunewin"));
        assert_eq!(paths.source_zip, Path::new("/pkgs/Widget 2.1_source.zip"));

        let paths =
            ArtifactPaths::for_input(Path::new("/pkgs/a.msi"), Some(Path::new("/out"))).unwrap();
        assert_eq!(paths.intunewin, Path::new("/out/a.intunewin"));
    }

    #[tokio::test]
    async fn produces_both_artifacts_and_removes_staging() {
        let fx = Fixture::new();
        let out_dir = fx.root.join("out");
        let runner = FakePackager::producing();

        let paths = package(&runner, &fx.settings, &fx.input(), Some(&out_dir))
            .await
            .unwrap();

        assert_eq!(paths.intunewin, out_dir.join("Contoso Setup.intunewin"));
        assert_eq!(paths.source_zip, out_dir.join("Contoso Setup_source.zip"));
        assert_eq!(std::fs::read_to_string(&paths.intunewin).unwrap(), "packaged");
        assert_eq!(
            entry_names(&paths.source_zip),
            vec![
                "Files/",
                "Files/app.msi",
                "Files/config.json",
                "Files/lang/",
                "Files/lang/en.mst",
                "deploy/",
                "deploy/install.ps1",
            ]
        );
        assert!(fx.staging_is_empty());
    }

    #[tokio::test]
    async fn tool_receives_staging_root_and_relative_setup_file() {
        let fx = Fixture::new();
        let runner = FakePackager::producing();

        package(&runner, &fx.settings, &fx.input(), None).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let args = &calls[0];
        assert_eq!(arg_after(args, "-c"), arg_after(args, "-o"));
        assert_eq!(
            PathBuf::from(arg_after(args, "-s")),
            Path::new("deploy").join("install.ps1")
        );
        assert_eq!(args.last().unwrap(), "-q");
        assert!(fx.root.join("in/Contoso Setup.intunewin").exists());
        assert!(fx.root.join("in/Contoso Setup_source.zip").exists());
    }

    #[tokio::test]
    async fn missing_tool_output_fails_with_tool_log_and_cleans_up() {
        let fx = Fixture::new();
        let runner = FakePackager::default();

        let err = package(&runner, &fx.settings, &fx.input(), None)
            .await
            .unwrap_err();

        match &err {
            Error::ArtifactMissing { output, .. } => {
                assert!(output.contains("setup file not found"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("setup file not found"));
        assert!(fx.staging_is_empty());
        assert!(!fx.root.join("in/Contoso Setup.intunewin").exists());
        assert!(!fx.root.join("in/Contoso Setup_source.zip").exists());
    }

    #[tokio::test]
    async fn missing_scripts_dir_fails_before_running_tool() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(fx.root.join("deploy")).unwrap();
        let runner = FakePackager::producing();

        assert!(package(&runner, &fx.settings, &fx.input(), None).await.is_err());
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(fx.staging_is_empty());
    }

    #[tokio::test]
    async fn missing_input_is_rejected() {
        let fx = Fixture::new();
        let runner = FakePackager::producing();

        let missing = fx.root.join("in/absent.msi");
        assert!(package(&runner, &fx.settings, &missing, None).await.is_err());
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(fx.staging_is_empty());
    }

    // Re-running over stale outputs overwrites them silently; nothing guards
    // against it, so this pins the current behaviour.
    #[tokio::test]
    async fn stale_outputs_are_overwritten() {
        let fx = Fixture::new();
        std::fs::write(fx.root.join("in/Contoso Setup.intunewin"), "stale").unwrap();
        std::fs::write(fx.root.join("in/Contoso Setup_source.zip"), "stale").unwrap();
        let runner = FakePackager::producing();

        let paths = package(&runner, &fx.settings, &fx.input(), None).await.unwrap();

        assert_eq!(std::fs::read_to_string(&paths.intunewin).unwrap(), "packaged");
        let names = entry_names(&paths.source_zip);
        assert!(names.contains(&"Files/app.msi".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".intunewin")));
    }

    // The tool's exit code is advisory; the artifact on disk decides.
    #[tokio::test]
    async fn nonzero_exit_with_artifact_still_packages() {
        let fx = Fixture::new();
        let runner = FakePackager {
            produce: true,
            exit_code: 2,
            ..Default::default()
        };

        let paths = package(&runner, &fx.settings, &fx.input(), None).await.unwrap();

        assert_eq!(std::fs::read_to_string(&paths.intunewin).unwrap(), "packaged");
        assert!(paths.source_zip.exists());
        assert!(fx.staging_is_empty());
    }

    #[tokio::test]
    async fn staging_parent_may_be_the_input_dir() {
        let fx = Fixture::new();
        let in_dir = fx.root.join("in");
        let settings = SettingsBuilder::new()
            .scripts_dir(fx.root.join("deploy"))
            .staging_parent(&in_dir)
            .tool_path(fx.root.join("tools/IntuneWinAppUtil.exe"))
            .build()
            .unwrap();
        let out_dir = fx.root.join("out");
        let runner = FakePackager::producing();

        let paths = package(&runner, &settings, &fx.input(), Some(&out_dir))
            .await
            .unwrap();

        let names = entry_names(&paths.source_zip);
        assert!(names.contains(&"Files/app.msi".to_string()));
        assert!(!names.iter().any(|n| n.contains("intunewin-stage-")));
        let mut left: Vec<_> = std::fs::read_dir(&in_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["Contoso Setup.msi", "config.json", "lang"]);
    }
}
