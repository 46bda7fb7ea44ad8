//! Command dispatch and handler modules.

mod fetch;
mod resolve;
mod versions;

use miette::Result;
use nupull_core::config::GlobalConfig;
use nupull_ops::settings::{Overrides, Settings};
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command, PackageArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let cancel = cancel_on_ctrl_c();
    match cli.command {
        Command::Fetch {
            package,
            output,
            jobs,
        } => fetch::exec(package, output, jobs, &cancel).await,
        Command::Resolve { package } => resolve::exec(package, &cancel).await,
        Command::Versions {
            package_id,
            prerelease,
            source,
        } => versions::exec(&package_id, prerelease, source).await,
    }
}

/// A token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signalled = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; finishing up");
            signalled.cancel();
        }
    });
    token
}

/// Defaults, then `~/.nupull/config.toml`, then flags.
fn load_settings(overrides: Overrides) -> Result<Settings> {
    let config = GlobalConfig::load()?;
    Ok(Settings::from_config(&config).with_overrides(overrides))
}

fn package_overrides(package: &PackageArgs) -> Overrides {
    Overrides {
        source: package.source.clone(),
        framework: package.framework.clone(),
        ..Overrides::default()
    }
}
