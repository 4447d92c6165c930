//! History command for listing and clearing recorded sessions.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use ft_core::{Clock, Session, format_mmss};
use ft_db::KvStore;

use crate::app::FocusApp;

fn session_row<Tz: TimeZone>(session: &Session, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let ended = DateTime::from_timestamp_millis(session.ended_at).map_or_else(
        || "????-??-?? ??:??".to_string(),
        |dt| dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
    );
    let project = session.project_name.as_deref().unwrap_or("-");
    let task = session.task.as_deref().unwrap_or("");
    format!(
        "{ended}  {:<5}  {:>6}  {project:<12}  {task}",
        session.phase.as_str(),
        format_mmss(session.duration_sec)
    )
    .trim_end()
    .to_string()
}

/// Writes up to `limit` sessions, newest first.
pub fn format_list<W: Write, Tz: TimeZone>(
    writer: &mut W,
    sessions: &[Session],
    limit: usize,
    tz: &Tz,
) -> std::io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    if sessions.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }
    for session in sessions.iter().take(limit) {
        writeln!(writer, "{}", session_row(session, tz))?;
    }
    let hidden = sessions.len().saturating_sub(limit);
    if hidden > 0 {
        writeln!(writer, "... and {hidden} more")?;
    }
    Ok(())
}

pub fn list<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &FocusApp<S, C>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let sessions = app.history().as_slice();
    if json {
        let shown = &sessions[..limit.min(sessions.len())];
        writeln!(writer, "{}", serde_json::to_string_pretty(shown)?)?;
    } else {
        format_list(writer, sessions, limit, &Local)?;
    }
    Ok(())
}

pub fn clear<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    yes: bool,
) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to delete history without --yes");
    }
    let removed = app.clear_history();
    writeln!(writer, "Deleted {removed} sessions.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ft_core::session::SessionMeta;
    use ft_core::{Phase, Project, ProjectId};
    use insta::assert_snapshot;

    use super::*;

    fn at(h: u32, m: u32) -> i64 {
        Utc.with_ymd_and_hms(2025, 2, 19, h, m, 0).unwrap().timestamp_millis()
    }

    fn sessions() -> Vec<Session> {
        let project = Project::new(ProjectId::new("study").unwrap(), "Study").unwrap();
        let meta = SessionMeta::new(Some("flashcards"), Some(&project));
        vec![
            Session::record(Phase::Break, 300, at(11, 5), &SessionMeta::default()),
            Session::record(Phase::Focus, 1500, at(11, 0), &meta),
            Session::record(Phase::Focus, 2700, at(9, 30), &SessionMeta::default()),
        ]
    }

    fn render(sessions: &[Session], limit: usize) -> String {
        let mut output = Vec::new();
        format_list(&mut output, sessions, limit, &Utc).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_list_sessions() {
        assert_snapshot!(render(&sessions(), 20), @r"
        2025-02-19 11:05  break   05:00  -
        2025-02-19 11:00  focus   25:00  Study         flashcards
        2025-02-19 09:30  focus   45:00  -
        ");
    }

    #[test]
    fn test_list_truncates() {
        assert_snapshot!(render(&sessions(), 1), @r"
        2025-02-19 11:05  break   05:00  -
        ... and 2 more
        ");
    }

    #[test]
    fn test_list_empty() {
        assert_eq!(render(&[], 5), "No sessions recorded.\n");
    }
}
