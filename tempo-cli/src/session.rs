//! Interactive lookup session: stdin lines in, rendered views out.

use std::time::Duration;

use anyhow::Context;
use tempo_core::{LookupHandle, LookupSnapshot, render};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Slack on top of the debounce window when draining after EOF.
const DRAIN_MARGIN: Duration = Duration::from_millis(50);

/// Feed each stdin line to the controller as the new query and redraw after
/// every published change. Returns once stdin is closed and the last edit
/// has been looked up.
pub async fn run(handle: LookupHandle, debounce: Duration) -> anyhow::Result<()> {
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    draw(&snapshots.borrow_and_update());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read query from stdin")? {
                    Some(text) => handle.set_query(text)?,
                    None => break,
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&snapshots.borrow_and_update());
            }
        }
    }

    debug!("stdin closed, waiting for the last lookup");
    drain(&handle, &mut snapshots, debounce).await;
    handle.shutdown().await;

    Ok(())
}

/// Let a pending debounce fire, then redraw until the lookup settles.
async fn drain(
    handle: &LookupHandle,
    snapshots: &mut tokio::sync::watch::Receiver<LookupSnapshot>,
    debounce: Duration,
) {
    let deadline = tokio::time::sleep(debounce + DRAIN_MARGIN);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline, if !deadline.is_elapsed() => {}
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return;
                }
                draw(&snapshots.borrow_and_update());
            }
        }

        if deadline.is_elapsed() && !handle.snapshot().is_loading() {
            return;
        }
    }
}

fn draw(snapshot: &LookupSnapshot) {
    println!("{}", render(snapshot));
}
