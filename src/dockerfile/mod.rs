//! Deterministic Dockerfile rendering.
//!
//! The renderer is a pure function of [`DockerfileSpec`]: the same fully
//! resolved inputs always produce the same build-instruction text. Staged
//! files are referenced by their context-relative paths; the image build
//! receives the host identity through the `UID` and `GID` build arguments.

use camino::Utf8PathBuf;

/// Context-relative directory apt key files are staged under.
pub const APT_KEYS_DIR: &str = "apt-keys";

/// Context-relative directory install scripts are staged under.
pub const SCRIPTS_DIR: &str = "scripts";

/// Fully resolved inputs for rendering the build instructions.
#[derive(Debug, Clone)]
pub struct DockerfileSpec {
    /// Base image to derive the container from.
    pub base_image: String,
    /// Username the host identity maps to.
    pub username: String,
    /// Home directory inside the container.
    pub home_dir: Utf8PathBuf,
    /// Login shell for the created user.
    pub shell: Utf8PathBuf,
    /// Working directory inside the container.
    pub work_dir: Utf8PathBuf,
    /// Context-relative apt sources file name, if configured.
    pub apt_sources: Option<String>,
    /// Context-relative apt key paths, if any.
    pub apt_keys: Vec<Utf8PathBuf>,
    /// Apt package specifications to install.
    pub packages: Vec<String>,
    /// Context-relative install script paths, in execution order.
    pub install_scripts: Vec<Utf8PathBuf>,
}

impl DockerfileSpec {
    /// Render the build instructions.
    #[must_use]
    pub fn render(&self) -> String {
        let mut pre_packages: Vec<&str> = Vec::new();
        if self.apt_sources.is_some() {
            pre_packages.push("apt-transport-https");
        }
        if !self.apt_keys.is_empty() {
            pre_packages.extend(["gnupg", "software-properties-common"]);
        }

        let mut out = format!(
            "FROM {}\n\nARG UID\nARG GID\n\n",
            self.base_image
        );

        if !self.apt_keys.is_empty() {
            out.push_str(&format!(
                "COPY [ \"{APT_KEYS_DIR}\", \"/tmp/build/{APT_KEYS_DIR}\" ]\n\n"
            ));
        }

        if !pre_packages.is_empty() {
            out.push_str(&format!(
                "RUN    apt-get update \\\n    && apt-get install --no-install-recommends -y \\\n       {} \\\n",
                pre_packages.join(" \\\n       ")
            ));
        }

        if !self.apt_keys.is_empty() {
            let key_args = self
                .apt_keys
                .iter()
                .map(|key| format!("/tmp/build/{key}"))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(
                "    && apt-key add {key_args} \\\n    && rm -rf /tmp/build \\\n"
            ));
        }

        if !pre_packages.is_empty() {
            out.push_str("    && rm -rf /var/lib/apt/lists/*\n\n");
        }

        if let Some(apt_sources) = &self.apt_sources {
            out.push_str(&format!(
                "COPY [ \"{apt_sources}\", \"/etc/apt/sources.list.d/build.list\" ]\n\n"
            ));
        }

        if !self.packages.is_empty() {
            out.push_str(&format!(
                "RUN    apt-get update \\\n    && apt-get install --no-install-recommends -y \\\n       {} \\\n    && rm -rf /var/lib/apt/lists/*\n\n",
                self.packages.join(" \\\n       ")
            ));
        }

        for script in &self.install_scripts {
            let name = script.file_name().unwrap_or(script.as_str());
            out.push_str(&format!(
                "COPY [ \"{script}\", \"/tmp/build/{name}\" ]\nRUN    '/tmp/build/{name}' \\\n    && rm -rf /tmp/build\n\n"
            ));
        }

        out.push_str(&format!(
            "# Create a user to map the host user to.\n\
             RUN    groupadd -o -g ${{GID}} '{username}' \\\n    \
             && useradd -m -o -u ${{UID}} -g ${{GID}} -s '{shell}' '{username}'\n\
             USER {username}\n\
             ENV HOME {home_dir}\n\
             ENV USER {username}\n\
             WORKDIR {work_dir}\n\n\
             CMD [ \"{shell}\" ]\n",
            username = self.username,
            shell = self.shell,
            home_dir = self.home_dir,
            work_dir = self.work_dir,
        ));

        out
    }
}
