//! Timer controls: start/pause, phase switch, reset, finish and presets.

use std::io::Write;

use anyhow::Result;
use ft_core::{Clock, Session, TimerKind, format_mmss};
use ft_db::KvStore;

use super::status::describe;
use crate::app::FocusApp;

/// One-line summary of a recorded session.
pub fn session_line(session: &Session) -> String {
    let mut line = format!(
        "Recorded {} session: {}",
        session.phase,
        format_mmss(session.duration_sec)
    );
    if let Some(project) = &session.project_name {
        line.push_str(&format!(" [{project}]"));
    }
    if let Some(task) = &session.task {
        line.push_str(&format!(" {task}"));
    }
    line
}

fn print_view<W: Write, S: KvStore, C: Clock>(writer: &mut W, app: &FocusApp<S, C>) -> Result<()> {
    let view = app.view();
    writeln!(
        writer,
        "{}: {} {}",
        view.phase,
        format_mmss(view.display_sec),
        describe(&view)
    )?;
    Ok(())
}

pub fn toggle<W: Write, S: KvStore, C: Clock>(writer: &mut W, app: &mut FocusApp<S, C>) -> Result<()> {
    app.start_pause();
    print_view(writer, app)
}

pub fn switch_phase<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
) -> Result<()> {
    app.toggle_phase();
    print_view(writer, app)
}

pub fn reset<W: Write, S: KvStore, C: Clock>(writer: &mut W, app: &mut FocusApp<S, C>) -> Result<()> {
    app.reset();
    print_view(writer, app)
}

pub fn finish<W: Write, S: KvStore, C: Clock>(writer: &mut W, app: &mut FocusApp<S, C>) -> Result<()> {
    match app.finish() {
        Some(session) => writeln!(writer, "{}", session_line(&session))?,
        None => writeln!(writer, "Nothing to record.")?,
    }
    print_view(writer, app)
}

pub fn preset<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    kind: TimerKind,
    minutes: Option<i64>,
) -> Result<()> {
    app.apply_preset(kind, minutes);
    print_view(writer, app)
}
