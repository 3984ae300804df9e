pub mod commands;
pub mod console;

use agsync_pipeline::SyncDirection;
use camino::Utf8PathBuf;

/// Arguments of one invocation, after clap parsing.
#[derive(Debug, Clone)]
pub struct SyncArgs {
    pub source: String,
    pub destination: String,
    pub new_name: Option<String>,
    pub recursive: bool,
    pub credentials: Option<Utf8PathBuf>,
}

pub fn direction_label(direction: SyncDirection) -> &'static str {
    match direction {
        SyncDirection::Pull => "Downloading",
        SyncDirection::Push => "Uploading",
        SyncDirection::Import => "Importing",
    }
}
