use std::path::Path;

use rla_core::config::Config;
use rla_core::config::VersionEntry;

use crate::contracts::ExecError;
use crate::contracts::ExecRequest;
use crate::contracts::ExitReport;
use crate::runner::ProcessRunner;

pub const BASE_DEPENDENCY: &str = "rubocop";
pub const LATEST: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub version: String,
}

impl DependencySpec {
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: LATEST.to_string(),
        }
    }

    /// `name` for unpinned gems, `name:version` otherwise.
    pub fn render(&self) -> String {
        if self.version == LATEST {
            self.name.clone()
        } else {
            format!("{}:{}", self.name, self.version)
        }
    }
}

impl From<&VersionEntry> for DependencySpec {
    fn from(entry: &VersionEntry) -> Self {
        match entry {
            VersionEntry::Name(name) => Self::latest(name.clone()),
            VersionEntry::Pinned { name, version } => Self {
                name: name.clone(),
                version: version.clone(),
            },
        }
    }
}

/// Installs rubocop and its plugins, either through bundler or `gem install`.
#[derive(Debug, Clone, Copy)]
pub struct Installer<'a> {
    config: &'a Config,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// The base dependency first, then configured entries. A later entry with
    /// the same name replaces the earlier one in place.
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        let mut merged = vec![DependencySpec::latest(BASE_DEPENDENCY)];
        for spec in self.config.versions.iter().map(DependencySpec::from) {
            match merged.iter_mut().find(|existing| existing.name == spec.name) {
                Some(existing) => *existing = spec,
                None => merged.push(spec),
            }
        }
        merged
    }

    fn rendered_dependencies(&self) -> Vec<String> {
        self.dependencies()
            .iter()
            .map(DependencySpec::render)
            .collect()
    }

    pub fn request(&self, cwd: &Path) -> ExecRequest {
        if self.config.bundle {
            return ExecRequest::new(
                cwd,
                "bundle",
                vec![
                    "install".to_string(),
                    format!("--gemfile={}", self.config.gemfile()),
                ],
            );
        }

        let mut args = vec!["install".to_string()];
        args.extend(self.rendered_dependencies());
        args.push("--no-document".to_string());
        ExecRequest::new(cwd, "gem", args)
    }

    pub fn run(&self, runner: &dyn ProcessRunner, cwd: &Path) -> Result<ExitReport, ExecError> {
        let request = self.request(cwd);
        tracing::debug!(bundle = self.config.bundle, command = %request, "installing dependencies");
        runner.run(&request)
    }
}
