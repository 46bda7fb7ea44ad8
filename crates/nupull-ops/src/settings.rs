//! Effective run settings: built-in defaults, then `~/.nupull/config.toml`,
//! then command-line flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nupull_core::config::GlobalConfig;
use nupull_core::framework::TargetFramework;
use nupull_registry::http::HttpSettings;
use nupull_registry::{NuGetRegistry, PackageRegistry};

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: String,
    pub framework: TargetFramework,
    pub output_dir: PathBuf,
    pub jobs: usize,
    pub http: HttpSettings,
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub framework: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

impl Settings {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            source: config.source.url.clone(),
            framework: TargetFramework::parse(&config.resolve.framework),
            output_dir: PathBuf::from(&config.download.output_dir),
            jobs: config.download.jobs.max(1),
            http: HttpSettings {
                timeout: Duration::from_secs(config.download.timeout_secs),
                retries: config.download.retries,
            },
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(framework) = overrides.framework {
            self.framework = TargetFramework::parse(&framework);
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs.max(1);
        }
        self
    }

    /// The NuGet feed these settings point at.
    pub fn registry(&self) -> miette::Result<Arc<dyn PackageRegistry>> {
        let registry = NuGetRegistry::new(self.source.clone(), &self.http)?;
        Ok(Arc::new(registry))
    }
}
