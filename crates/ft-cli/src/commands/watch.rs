//! Watch command: follows the running timer on one refreshing line.
//!
//! Each tick re-derives the display from the stored timestamps, so a slow
//! or skipped tick never drifts the timer. An expired countdown is recorded
//! and saved as soon as a tick sees it.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use ft_core::{Clock, format_mmss};
use ft_db::KvStore;
use tokio::time::MissedTickBehavior;

use super::status::describe;
use super::timer::session_line;
use crate::app::FocusApp;

/// Shortest refresh period accepted.
const MIN_TICK: Duration = Duration::from_millis(50);

/// Follows the timer until nothing is running or `shutdown` resolves.
pub async fn run<W, S, C, F>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    period: Duration,
    shutdown: F,
) -> Result<()>
where
    W: Write,
    S: KvStore,
    C: Clock,
    F: Future<Output = ()>,
{
    if !app.engine().any_running() {
        writeln!(writer, "Timer is not running.")?;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(period.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(session) = app.tick() {
                    writeln!(writer)?;
                    writeln!(writer, "{}", session_line(&session))?;
                    app.flush();
                }
                let view = app.view();
                write!(
                    writer,
                    "\r{}: {} {}",
                    view.phase,
                    format_mmss(view.display_sec),
                    describe(&view)
                )?;
                writer.flush()?;
                if !app.engine().any_running() {
                    writeln!(writer)?;
                    break;
                }
            }
            () = &mut shutdown => {
                writeln!(writer)?;
                tracing::debug!("watch interrupted");
                break;
            }
        }
    }
    Ok(())
}
