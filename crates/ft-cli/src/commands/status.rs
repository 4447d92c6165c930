//! Status command for showing the current timer.

use std::io::Write;

use anyhow::Result;
use ft_core::{Clock, TimerKind, TimerView, format_mmss};
use ft_db::KvStore;
use serde::Serialize;

use crate::app::FocusApp;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusJson<'a> {
    #[serde(flatten)]
    view: TimerView,
    display: String,
    task: Option<&'a str>,
    project: Option<&'a str>,
    identity: String,
    sessions: usize,
}

/// Describes the timer kind, e.g. `countdown 25m (running)`.
pub fn describe(view: &TimerView) -> String {
    let state = if view.running { "running" } else { "paused" };
    match view.kind {
        TimerKind::Stopwatch => format!("stopwatch ({state})"),
        TimerKind::Countdown => format!("countdown {}m ({state})", view.countdown_min),
    }
}

pub fn run<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &FocusApp<S, C>,
    json: bool,
) -> Result<()> {
    let view = app.view();
    let task = Some(app.task()).filter(|t| !t.is_empty());
    let project = app.projects().active().map(|p| p.name.as_str());

    if json {
        let status = StatusJson {
            view,
            display: format_mmss(view.display_sec),
            task,
            project,
            identity: app.store().identity().key(),
            sessions: app.history().len(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
        return Ok(());
    }

    writeln!(writer, "Phase:    {}", view.phase)?;
    writeln!(writer, "Timer:    {}", describe(&view))?;
    writeln!(writer, "Time:     {}", format_mmss(view.display_sec))?;
    writeln!(writer, "Task:     {}", task.unwrap_or("(none)"))?;
    writeln!(writer, "Project:  {}", project.unwrap_or("(none)"))?;
    writeln!(writer, "Sessions: {}", app.history().len())?;
    Ok(())
}
