use agsync_cli::{commands, SyncArgs};
use agsync_config::ENV_CREDENTIALS_FILE;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Copy files and directory trees between the local filesystem and an
/// agave:// files service.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long)]
    verbose: bool,
    /// Local path, agave://system/path, or http(s) URL
    source: String,
    /// Local path or agave://system/path
    #[arg(default_value = ".")]
    destination: String,
    /// Rename the transferred file, or the top-level directory when recursive
    #[arg(short = 'f', long = "new-name")]
    new_name: Option<String>,
    #[arg(short, long)]
    recursive: bool,
    /// Credential cache to read instead of ~/.agave/current
    #[arg(long, env = ENV_CREDENTIALS_FILE)]
    credentials: Option<Utf8PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    commands::cmd_sync(SyncArgs {
        source: cli.source,
        destination: cli.destination,
        new_name: cli.new_name,
        recursive: cli.recursive,
        credentials: cli.credentials,
    })
    .await?;

    Ok(())
}
