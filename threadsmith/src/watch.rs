//! `watch`: re-plan a draft file while it is being edited.

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thread_splitter::{Debouncer, SplitOptions, ThreadPlanner};

use crate::preview::{self, OutputFormat};

/// How often the file is re-read.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Watch `path` until Ctrl-C, printing a fresh preview whenever its contents
/// settle after a change.
pub async fn run(path: &Path, options: SplitOptions, format: OutputFormat, delay: Duration) -> Result<()> {
    let initial = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let planner = ThreadPlanner::new(options);
    print!("{}", render_update(&planner, &initial, format)?);

    let (debouncer, mut settled) = Debouncer::spawn(delay);
    let poller = tokio::spawn(poll_file(path.to_path_buf(), initial, debouncer));

    eprintln!("Watching {} (Ctrl-C to stop)", path.display());
    loop {
        tokio::select! {
            text = settled.recv() => match text {
                Some(text) => print!("{}", render_update(&planner, &text, format)?),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.abort();
    Ok(())
}

/// Push the file's contents into `debouncer` each time they change.
async fn poll_file(path: PathBuf, mut last: String, debouncer: Debouncer<String>) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        match tokio::fs::read_to_string(&path).await {
            Ok(current) => {
                if let Some(text) = changed(&mut last, current) {
                    debug!("{} changed ({} bytes)", path.display(), text.len());
                    if !debouncer.push(text) {
                        return;
                    }
                }
            }
            // Editors often replace the file; the next tick usually sees it again
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }
    }
}

/// The new contents when they differ from `last`.
fn changed(last: &mut String, current: String) -> Option<String> {
    if *last == current {
        return None;
    }
    *last = current.clone();
    Some(current)
}

fn render_update(planner: &ThreadPlanner, text: &str, format: OutputFormat) -> Result<String> {
    let plan = planner.plan(text);
    let body = preview::render(&plan, planner.options(), format)?;
    Ok(format!(
        "==== {} · {} post(s) ====\n{}",
        Local::now().format("%H:%M:%S"),
        plan.len(),
        body
    ))
}
