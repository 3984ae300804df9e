use std::sync::Arc;

use agsync_infra::{default_http_client, ApiClient, Session};
use agsync_pipeline::{SyncEngine, SyncOutcome, SyncRequest, SyncStats};
use anyhow::{Context, Result};
use humansize::{format_size, DECIMAL};

use crate::console::ConsoleSink;
use crate::{direction_label, SyncArgs};

pub async fn cmd_sync(args: SyncArgs) -> Result<SyncOutcome> {
    let session =
        Session::load(args.credentials.as_deref()).context("Failed to load credentials")?;
    tracing::debug!("Using {:?}", session);
    let service = session.service().clone();

    let req = SyncRequest::resolve(
        &args.source,
        &args.destination,
        &service,
        args.recursive,
        args.new_name,
    )?;
    let direction = req.validate()?;

    println!(":: {} {}", direction_label(direction), req.source);
    println!("   To: {}", req.destination);

    let client = default_http_client().context("Failed to build HTTP client")?;
    let console = Arc::new(ConsoleSink::new());
    let engine = SyncEngine::new(ApiClient::new(client, session), console.clone());

    let result = engine.run(&req).await;
    console.finish();
    let outcome = result?;

    print_summary(&outcome.stats);
    if let Some(response) = &outcome.response {
        println!("{}", serde_json::to_string_pretty(response)?);
    }
    Ok(outcome)
}

fn print_summary(stats: &SyncStats) {
    println!("\n:: Done");
    println!("   Directories created: {}", stats.dirs_created);
    println!("   Files downloaded:    {}", stats.files_downloaded);
    println!("   Files touched:       {}", stats.files_touched);
    println!("   Files uploaded:      {}", stats.files_uploaded);
    println!("   Files imported:      {}", stats.files_imported);
    println!("   Skipped:             {}", stats.skipped);
    println!(
        "   Transferred:         {}",
        format_size(stats.bytes_transferred, DECIMAL)
    );
}
