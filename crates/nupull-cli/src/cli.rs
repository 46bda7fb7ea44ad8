//! CLI argument definitions for nupull.
//!
//! Package ids and versions are validated here, so malformed input never
//! reaches the resolver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nupull_core::identity::PackageId;
use nupull_core::version::NuGetVersion;

#[derive(Parser, Debug)]
#[command(
    name = "nupull",
    version,
    about = "Download a NuGet package and all of its dependencies for offline use",
    long_about = "nupull resolves a NuGet package's transitive dependencies for a target \
                  framework, using the lowest version each dependency range allows, and \
                  downloads every .nupkg into one directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a package and download it with all of its dependencies
    Fetch {
        #[command(flatten)]
        package: PackageArgs,
        /// Directory the .nupkg files are written to [default: OfflinePackages]
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Number of parallel downloads [default: 4]
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Resolve a package's dependencies and list them without downloading
    Resolve {
        #[command(flatten)]
        package: PackageArgs,
    },

    /// List the published versions of a package
    Versions {
        /// Package id, e.g. Newtonsoft.Json
        #[arg(value_parser = parse_package_id)]
        package_id: PackageId,
        /// Include pre-release versions
        #[arg(long)]
        prerelease: bool,
        /// Service index URL of the NuGet feed
        #[arg(long, value_name = "URL", env = "NUPULL_SOURCE")]
        source: Option<String>,
    },
}

/// Arguments shared by `fetch` and `resolve`.
#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Package id, e.g. Newtonsoft.Json
    #[arg(value_parser = parse_package_id)]
    pub package_id: PackageId,
    /// Exact version to fetch [default: latest stable]
    #[arg(long = "version", value_name = "VERSION", value_parser = parse_version)]
    pub package_version: Option<NuGetVersion>,
    /// Target framework used to pick dependency groups [default: net10.0]
    #[arg(short, long, value_name = "TFM")]
    pub framework: Option<String>,
    /// Service index URL of the NuGet feed
    #[arg(long, value_name = "URL", env = "NUPULL_SOURCE")]
    pub source: Option<String>,
    /// Print a JSON report to stdout instead of status lines
    #[arg(long)]
    pub json: bool,
}

fn parse_package_id(s: &str) -> Result<PackageId, String> {
    PackageId::parse(s).map_err(|e| e.to_string())
}

fn parse_version(s: &str) -> Result<NuGetVersion, String> {
    NuGetVersion::parse(s).map_err(|e| e.to_string())
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fetch_flags() {
        let cli = Cli::try_parse_from([
            "nupull",
            "fetch",
            "Newtonsoft.Json",
            "--version",
            "13.0.1",
            "-f",
            "net8.0",
            "-o",
            "out",
            "-j",
            "8",
        ])
        .unwrap();
        match cli.command {
            Command::Fetch {
                package,
                output,
                jobs,
            } => {
                assert_eq!(package.package_id.as_str(), "Newtonsoft.Json");
                assert_eq!(package.package_version.unwrap().to_string(), "13.0.1");
                assert_eq!(package.framework.as_deref(), Some("net8.0"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(jobs, Some(8));
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_version() {
        assert!(Cli::try_parse_from(["nupull", "fetch", "Pkg", "--version", "1.x"]).is_err());
    }
}
