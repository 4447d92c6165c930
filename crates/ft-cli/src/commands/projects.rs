//! Projects command for managing the tags sessions are recorded against.

use std::io::Write;

use anyhow::{Context, Result};
use ft_core::{Clock, ProjectId, ProjectList};
use ft_db::KvStore;

use crate::app::FocusApp;

/// Writes the project list; the active project is marked with `*`.
pub fn format_list<W: Write>(writer: &mut W, projects: &ProjectList) -> std::io::Result<()> {
    let width = projects
        .projects()
        .iter()
        .map(|p| p.id.as_str().len())
        .max()
        .unwrap_or(0);
    for project in projects.projects() {
        let marker = if projects.active_id() == Some(&project.id) { '*' } else { ' ' };
        writeln!(writer, "{marker} {:<width$}  {}", project.id.as_str(), project.name)?;
    }
    Ok(())
}

fn parse_id(id: &str) -> Result<ProjectId> {
    ProjectId::new(id).with_context(|| format!("invalid project id '{id}'"))
}

pub fn list<W: Write, S: KvStore, C: Clock>(writer: &mut W, app: &FocusApp<S, C>) -> Result<()> {
    format_list(writer, app.projects())?;
    Ok(())
}

pub fn add<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    name: &str,
) -> Result<()> {
    let id = app.add_project(name).context("failed to add project")?;
    writeln!(writer, "Added project {id} (active)")?;
    Ok(())
}

pub fn rename<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    id: &str,
    name: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    if !app.rename_project(&id, name).context("failed to rename project")? {
        anyhow::bail!("no project with id '{id}'");
    }
    writeln!(writer, "Renamed {id} to {}", name.trim())?;
    Ok(())
}

pub fn delete<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    id: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    if !app.delete_project(&id) {
        anyhow::bail!("no project with id '{id}'");
    }
    writeln!(writer, "Deleted project {id}")?;
    Ok(())
}

pub fn select<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &mut FocusApp<S, C>,
    id: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    if !app.select_project(&id) {
        anyhow::bail!("no project with id '{id}'");
    }
    writeln!(writer, "Active project: {id}")?;
    Ok(())
}
