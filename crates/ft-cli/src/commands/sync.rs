//! Sync command: exchanges state with a mirror store.
//!
//! The mirror stands in for a size-limited remote key-value store. Pushing
//! writes the session log in chunks plus the task, projects and timer.
//! Pulling merges the remote log into the local one, takes the remote task
//! and projects, and replaces the timer only with a newer snapshot.

use std::io::Write;

use anyhow::{Context, Result};
use ft_core::Clock;
use ft_db::{KvStore, Mirror};

use crate::app::{FocusApp, RemoteState};

pub fn push<W, S, C, M>(writer: &mut W, app: &FocusApp<S, C>, mirror: &mut Mirror<M>) -> Result<()>
where
    W: Write,
    S: KvStore,
    C: Clock,
    M: KvStore,
{
    let chunks = mirror
        .push_history(app.history().as_slice())
        .context("failed to push history")?;
    mirror.push_task(app.task()).context("failed to push task")?;
    mirror
        .push_projects(app.projects())
        .context("failed to push projects")?;
    mirror
        .push_timer(&app.timer_snapshot())
        .context("failed to push timer")?;

    tracing::info!(sessions = app.history().len(), chunks, "pushed to mirror");
    writeln!(
        writer,
        "Pushed {} sessions in {chunks} chunks.",
        app.history().len()
    )?;
    Ok(())
}

pub fn pull<W, S, C, M>(writer: &mut W, app: &mut FocusApp<S, C>, mirror: &Mirror<M>) -> Result<()>
where
    W: Write,
    S: KvStore,
    C: Clock,
    M: KvStore,
{
    let remote = RemoteState {
        history: mirror.pull_history().context("failed to pull history")?,
        task: mirror.pull_task().context("failed to pull task")?,
        projects: mirror.pull_projects().context("failed to pull projects")?,
        timer: mirror.pull_timer().context("failed to pull timer")?,
    };
    let summary = app.apply_remote(remote);

    tracing::info!(?summary, "pulled from mirror");
    writeln!(writer, "Pulled {} new sessions.", summary.new_sessions)?;
    if summary.timer_replaced {
        writeln!(writer, "Timer replaced by a newer remote state.")?;
    }
    Ok(())
}
