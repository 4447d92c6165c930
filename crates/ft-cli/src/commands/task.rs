//! Task command for showing or setting the current task.

use std::io::Write;

use anyhow::Result;
use ft_core::Clock;
use ft_db::KvStore;

use crate::app::FocusApp;

pub fn run<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    text: Option<&str>,
    clear: bool,
) -> Result<()> {
    if clear {
        app.set_task("");
        writeln!(writer, "Task cleared.")?;
        return Ok(());
    }
    if let Some(text) = text {
        app.set_task(text);
    }
    if app.task().is_empty() {
        writeln!(writer, "No task set.")?;
    } else {
        writeln!(writer, "Task: {}", app.task())?;
    }
    Ok(())
}
