//! Library-facing build-and-run orchestration.
//!
//! Consumes the effective configuration and drives the whole flow: package
//! list assembly, build-context staging plan, mount resolution, optional
//! daemon-socket passthrough, Dockerfile rendering, and the external build
//! and run invocations. Everything before the first external invocation is
//! pure resolution; any failure there aborts with nothing built.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::EffectiveConfig;
use crate::dockerfile::{APT_KEYS_DIR, DockerfileSpec, SCRIPTS_DIR};
use crate::engine::{BuildContext, BuildRequest, DockerCli, RunRequest, resolve_passthrough};
use crate::error::{ConfigError, FilesystemError, Result};
use crate::mounts::resolve_mounts;

/// Build the image and run the configured command inside it.
///
/// # Errors
///
/// Propagates every terminal failure class: configuration errors (root
/// uid/gid, unreadable packages file, unsupported passthrough scheme),
/// filesystem resolution errors (missing mount source, staging failures),
/// and external process failures carrying the child's exit code.
pub fn build_and_run(opts: &EffectiveConfig) -> Result<()> {
    opts.validate()?;

    let packages = collect_packages(opts)?;
    let staging = StagingPlan::from_config(opts)?;
    let work_dir = opts.container_work_dir();

    let mut mounts = resolve_mounts(&opts.mounts, &work_dir, !opts.no_recursive_mount)?;
    let mut groups = Vec::new();
    if opts.docker_passthrough {
        let passthrough = resolve_passthrough(&opts.docker_host, opts.uid)?;
        // Inserted after mount resolution: a user mount at the same canonical
        // host path is silently replaced by the socket mount.
        mounts.insert(passthrough.host_path, passthrough.container_path);
        if let Some(gid) = passthrough.extra_group {
            groups.push(gid.to_string());
        }
    }

    let dockerfile = DockerfileSpec {
        base_image: opts.base_image.clone(),
        username: opts.username.clone(),
        home_dir: opts.home_dir.clone(),
        shell: opts.shell.clone(),
        work_dir: work_dir.clone(),
        apt_sources: staging.apt_sources.clone(),
        apt_keys: staging.apt_keys.clone(),
        packages,
        install_scripts: staging.install_scripts.clone(),
    }
    .render();

    let context = BuildContext::create(opts.build_directory.as_deref())?;
    let dockerfile_path = context.write_dockerfile(&dockerfile)?;
    tracing::info!("wrote Dockerfile at {dockerfile_path}:\n{dockerfile}");
    for (source, staged) in &staging.copies {
        context.copy_file(source, staged)?;
    }

    let docker = DockerCli::new(opts.docker.clone());
    docker.build_image(&BuildRequest {
        image_name: &opts.image_name,
        context_dir: context.root(),
        dockerfile: &dockerfile_path,
        uid: opts.uid,
        gid: opts.gid,
        quiet: opts.verbose < 1,
    })?;
    docker.run_container(&RunRequest {
        image_name: &opts.image_name,
        run_flags: &opts.docker_run_flags,
        groups: &groups,
        mounts: &mounts,
        command: &opts.command,
    })
}

/// The files to copy into the build context and their context-relative
/// staging paths, plus the staged names the Dockerfile refers to.
#[derive(Debug, Default)]
struct StagingPlan {
    /// Host source path → context-relative destination.
    copies: Vec<(Utf8PathBuf, Utf8PathBuf)>,
    /// Context-relative apt sources file name.
    apt_sources: Option<String>,
    /// Context-relative apt key paths.
    apt_keys: Vec<Utf8PathBuf>,
    /// Context-relative install script paths, in configured order.
    install_scripts: Vec<Utf8PathBuf>,
}

impl StagingPlan {
    /// Derive the staging plan from the effective configuration.
    fn from_config(opts: &EffectiveConfig) -> Result<Self> {
        let mut plan = Self::default();

        if let Some(source) = &opts.apt_sources_file {
            let name = file_name_of("apt-sources-file", source)?;
            plan.copies.push((source.clone(), Utf8PathBuf::from(name)));
            plan.apt_sources = Some(name.to_owned());
        }

        if let Some(keys_dir) = &opts.apt_keys_dir {
            for name in list_directory(keys_dir)? {
                let staged = Utf8PathBuf::from(APT_KEYS_DIR).join(&name);
                plan.copies.push((keys_dir.join(&name), staged.clone()));
                plan.apt_keys.push(staged);
            }
        }

        for (index, source) in opts.install_scripts.iter().enumerate() {
            let name = file_name_of("install-script", source)?;
            // The index prefix keeps same-named scripts from different
            // directories distinct inside the context.
            let staged = Utf8PathBuf::from(format!("{SCRIPTS_DIR}/{index}_{name}"));
            plan.copies.push((source.clone(), staged.clone()));
            plan.install_scripts.push(staged);
        }

        Ok(plan)
    }
}

/// Read the packages file and append the extra `--package` specifications,
/// splitting every entry on whitespace.
fn collect_packages(opts: &EffectiveConfig) -> Result<Vec<String>> {
    let text = crate::config::read_ambient(&opts.packages_file).map_err(|error| {
        ConfigError::PackagesFileUnreadable {
            path: opts.packages_file.clone(),
            message: error.to_string(),
        }
    })?;

    let mut packages: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    for extra in &opts.extra_packages {
        packages.extend(extra.split_whitespace().map(str::to_owned));
    }
    Ok(packages)
}

/// The final component of a configured path.
fn file_name_of<'a>(field: &str, path: &'a Utf8Path) -> Result<&'a str> {
    path.file_name().ok_or_else(|| {
        ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("path '{path}' has no file name"),
        }
        .into()
    })
}

/// The sorted entry names of a directory.
fn list_directory(dir: &Utf8Path) -> Result<Vec<String>> {
    let entries = dir.read_dir_utf8().map_err(|error| FilesystemError::Io {
        path: dir.to_owned(),
        message: error.to_string(),
    })?;

    let mut names = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|error| FilesystemError::Io {
            path: dir.to_owned(),
            message: error.to_string(),
        })?;
        names.push(entry.file_name().to_owned());
    }
    names.sort();
    Ok(names)
}
