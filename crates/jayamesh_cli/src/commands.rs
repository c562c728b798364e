//! Command handlers. Each one builds the services it needs from the open
//! connection and prints a plain-text result.

use crate::cli::{
    DataAction, FocusAction, GoalAction, NoteAction, ProjectAction, ScopeArgs, SectionAction,
    TaskAction,
};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use jayamesh_core::markup::{format_note, render_text};
use jayamesh_core::model::focus::{format_clock, FocusTimer};
use jayamesh_core::model::note::note_preview;
use jayamesh_core::repo::focus_repo::SqliteFocusSessionRepository;
use jayamesh_core::repo::goal_repo::SqliteGoalRepository;
use jayamesh_core::repo::note_repo::SqliteNoteRepository;
use jayamesh_core::repo::project_repo::SqliteProjectRepository;
use jayamesh_core::repo::section_repo::SqliteSectionRepository;
use jayamesh_core::repo::task_repo::SqliteTaskRepository;
use jayamesh_core::service::focus_service::{FocusService, SessionRecord};
use jayamesh_core::service::goal_service::{GoalDraft, GoalService};
use jayamesh_core::service::note_service::{parse_tag_list, split_pinned, NoteService};
use jayamesh_core::service::project_service::{ProjectDraft, ProjectService};
use jayamesh_core::service::section_service::SectionService;
use jayamesh_core::service::stats_service::StatsService;
use jayamesh_core::service::task_service::{group_by_status, TaskDraft, TaskService};
use jayamesh_core::transfer::{
    backup_file_name, clear_all, export_to_file, import_file, reset_store, store_info,
};
use jayamesh_core::{seed_if_empty, CoreConfig, ListScope, Note, Task};
use log::info;
use rusqlite::Connection;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parses `YYYY-MM-DD` as midnight UTC.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn short_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn start_of_today() -> DateTime<Utc> {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

fn list_scope(args: &ScopeArgs) -> ListScope {
    match (args.project, args.section) {
        (_, Some(section)) => ListScope::Section(section),
        (Some(project), None) => ListScope::Project(project),
        (None, None) => ListScope::All,
    }
}

pub fn init(conn: &Connection) -> Result<()> {
    if seed_if_empty(conn)? {
        println!("Store initialized with the sample project.");
    } else {
        println!("Store already contains projects; nothing seeded.");
    }
    Ok(())
}

pub fn stats(conn: &Connection) -> Result<()> {
    let service = StatsService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteSectionRepository::try_new(conn)?,
        SqliteGoalRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    );
    let stats = service.dashboard(Utc::now())?;
    let focus = FocusService::new(SqliteFocusSessionRepository::try_new(conn)?);
    let focus_today = focus.completed_since(start_of_today())?;

    println!("Projects        {}", stats.projects);
    println!("Sections        {}", stats.sections);
    println!(
        "Goals           {} ({}% completed, {} overdue)",
        stats.goals, stats.goal_completion, stats.overdue_goals
    );
    println!(
        "Tasks           {} ({}% done, {} overdue)",
        stats.tasks, stats.task_completion, stats.overdue_tasks
    );
    println!("Focus today     {focus_today}");
    Ok(())
}

pub fn info(conn: &Connection, config: &CoreConfig) -> Result<()> {
    let info = store_info(conn)?;
    println!("Database        {}", config.db_path.display());
    println!("Logs            {}", config.log_dir.display());
    println!("Core version    {}", jayamesh_core::core_version());
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

pub fn data(conn: &mut Connection, action: DataAction) -> Result<()> {
    match action {
        DataAction::Export { out } => {
            let path = out
                .unwrap_or_else(|| PathBuf::from(backup_file_name(Local::now().date_naive())));
            let document = export_to_file(conn, &path, Utc::now())
                .with_context(|| format!("export to `{}` failed", path.display()))?;
            println!(
                "Exported {} projects, {} sections, {} goals, {} tasks, {} notes to {}",
                document.projects.len(),
                document.sections.len(),
                document.goals.len(),
                document.tasks.len(),
                document.notes.len(),
                path.display()
            );
        }
        DataAction::Import { file } => {
            let info = import_file(conn, &file)
                .with_context(|| format!("import from `{}` failed", file.display()))?;
            println!(
                "Imported {} projects, {} sections, {} goals, {} tasks, {} notes",
                info.projects, info.sections, info.goals, info.tasks, info.notes
            );
        }
        DataAction::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every record without --yes");
            }
            clear_all(conn)?;
            println!("All records deleted.");
        }
        DataAction::Reset { yes } => {
            if !yes {
                bail!("refusing to reset the store without --yes");
            }
            let info = reset_store(conn)?;
            println!(
                "Store reset to schema v{} with {} sample tasks.",
                info.schema_version, info.tasks
            );
        }
    }
    Ok(())
}

pub fn project(conn: &Connection, action: ProjectAction) -> Result<()> {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn)?);
    match action {
        ProjectAction::List { all } => {
            println!("{:<36} {:<10} {:<3} {:<8} TITLE", "ID", "STATUS", "PRI", "TYPE");
            println!("{}", "-".repeat(80));
            for project in service.list_projects(all)? {
                let archived = if project.archived { " (archived)" } else { "" };
                println!(
                    "{:<36} {:<10} {:<3} {:<8} {}{}",
                    project.id,
                    project.status.as_str(),
                    project.priority,
                    project.kind,
                    project.title,
                    archived
                );
            }
        }
        ProjectAction::Add {
            title,
            kind,
            status,
            priority,
            color,
            description,
        } => {
            let project = service.create_project(ProjectDraft {
                title,
                kind,
                status,
                priority,
                color,
                description,
            })?;
            println!("Created project: {}", project.id);
        }
        ProjectAction::Status { id, status } => {
            service.set_status(id, status)?;
            println!("Updated project status to: {}", status.as_str());
        }
        ProjectAction::Archive { id, undo } => {
            let project = service.set_archived(id, !undo)?;
            let verb = if project.archived { "Archived" } else { "Restored" };
            println!("{verb} project: {}", project.title);
        }
        ProjectAction::Delete { id } => {
            service.delete_project(id)?;
            println!("Deleted project {id} and everything it contained.");
        }
    }
    Ok(())
}

pub fn section(conn: &Connection, action: SectionAction) -> Result<()> {
    let service = SectionService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteSectionRepository::try_new(conn)?,
    );
    match action {
        SectionAction::List { project } => {
            for section in service.list_sections(project)? {
                println!(
                    "{}  {:>2}. {} [{}]",
                    section.id, section.order, section.name, section.kind
                );
            }
        }
        SectionAction::Add {
            project,
            name,
            kind,
        } => {
            let section = service.create_section(project, &name, kind.as_deref())?;
            println!("Created section: {} (order {})", section.id, section.order);
        }
        SectionAction::Rename { id, name } => {
            let section = service.rename_section(id, &name)?;
            println!("Renamed section to: {}", section.name);
        }
        SectionAction::Delete { id } => {
            service.delete_section(id)?;
            println!("Deleted section {id} with its goals, tasks and notes.");
        }
    }
    Ok(())
}

pub fn goal(conn: &Connection, action: GoalAction) -> Result<()> {
    let service = GoalService::new(
        SqliteSectionRepository::try_new(conn)?,
        SqliteGoalRepository::try_new(conn)?,
    );
    match action {
        GoalAction::List { scope } => {
            let now = Utc::now();
            for goal in service.list_goals(list_scope(&scope))? {
                let overdue = if goal.is_overdue(now) { " OVERDUE" } else { "" };
                println!(
                    "{}  {:<11} {:>5.1}%  {}/{}  due {}  {}{}",
                    goal.id,
                    goal.status.as_str(),
                    goal.progress_percent(),
                    goal.current,
                    goal.target,
                    short_date(goal.deadline),
                    goal.title,
                    overdue
                );
            }
        }
        GoalAction::Add {
            section,
            title,
            target,
            deadline,
            priority,
        } => {
            let mut draft = GoalDraft::new(title, target);
            draft.deadline = deadline;
            draft.priority = priority;
            let goal = service.create_goal(section, draft)?;
            println!("Created goal: {} (due {})", goal.id, short_date(goal.deadline));
        }
        GoalAction::Progress { id, value } => {
            let goal = service.update_progress(id, value)?;
            println!(
                "{}: {}/{} ({})",
                goal.title,
                goal.current,
                goal.target,
                goal.status.as_str()
            );
        }
        GoalAction::Delete { id } => {
            service.delete_goal(id)?;
            println!("Deleted goal {id}.");
        }
    }
    Ok(())
}

fn print_task(task: &Task, now: DateTime<Utc>) {
    let overdue = if task.is_overdue(now) { " OVERDUE" } else { "" };
    let recurring = if task.recurring { " ↻" } else { "" };
    println!(
        "{}  {:<11} P{}  due {}  {}{}{}",
        task.id,
        task.status.as_str(),
        task.priority,
        short_date(task.due_date),
        task.title,
        recurring,
        overdue
    );
}

pub fn task(conn: &Connection, action: TaskAction) -> Result<()> {
    let service = TaskService::new(
        SqliteSectionRepository::try_new(conn)?,
        SqliteGoalRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    );
    let now = Utc::now();
    match action {
        TaskAction::List { scope, board } => {
            let tasks = service.list_tasks(list_scope(&scope))?;
            if board {
                for column in group_by_status(tasks) {
                    println!("== {} ({})", column.status.as_str(), column.tasks.len());
                    for task in &column.tasks {
                        print_task(task, now);
                    }
                }
            } else {
                for task in &tasks {
                    print_task(task, now);
                }
            }
        }
        TaskAction::Add {
            section,
            title,
            kind,
            priority,
            goal,
            recurring,
            due,
            hours,
            description,
        } => {
            let mut draft = TaskDraft::titled(title);
            draft.kind = kind;
            draft.priority = priority;
            draft.goal_id = goal;
            draft.recurring = recurring;
            draft.due_date = due;
            draft.estimated_hours = hours;
            draft.description = description;
            let task = service.create_task(section, draft)?;
            println!("Created task: {}", task.id);
        }
        TaskAction::Capture { project, title } => {
            let task = service.quick_capture(project, &title)?;
            println!("Captured task: {}", task.id);
        }
        TaskAction::Status { id, status } => {
            let task = service.set_status(id, status)?;
            println!("{} -> {}", task.title, task.status.as_str());
        }
        TaskAction::Toggle { id } => {
            let task = service.toggle_done(id)?;
            println!("{} -> {}", task.title, task.status.as_str());
        }
        TaskAction::Delete { id } => {
            service.delete_task(id)?;
            println!("Deleted task {id}.");
        }
    }
    Ok(())
}

fn print_note_line(note: &Note) {
    let pin = if note.is_pinned { "📌 " } else { "" };
    let tags = if note.tags.is_empty() {
        String::new()
    } else {
        format!("  #{}", note.tags.join(" #"))
    };
    println!("{}  {pin}{}{tags}", note.id, note.title);
    let preview = note_preview(&note.content).replace('\n', " ");
    if !preview.is_empty() {
        println!("    {preview}");
    }
}

pub fn note(conn: &Connection, action: NoteAction) -> Result<()> {
    let service = NoteService::new(
        SqliteSectionRepository::try_new(conn)?,
        SqliteNoteRepository::try_new(conn)?,
    );
    match action {
        NoteAction::List { scope, search } => {
            let scope = list_scope(&scope);
            let notes = match search {
                Some(term) => service.search_notes(scope, &term)?,
                None => service.list_notes(scope)?,
            };
            let split = split_pinned(notes);
            for note in split.pinned.iter().chain(split.others.iter()) {
                print_note_line(note);
            }
        }
        NoteAction::Add {
            section,
            title,
            content,
            file,
            tags,
        } => {
            let content = match file {
                Some(path) => read_text(Some(path.as_path()))?,
                None => content,
            };
            let note = service.create_note(section, &title, content, &tags)?;
            println!("Created note: {}", note.id);
        }
        NoteAction::Show { id } => {
            let Some(note) = service.get_note(id)? else {
                bail!("note not found: {id}");
            };
            println!("{}", note.title);
            if !note.tags.is_empty() {
                println!("#{}", note.tags.join(" #"));
            }
            println!();
            println!("{}", render_text(&format_note(&note.content)));
        }
        NoteAction::Edit { id, title, content } => {
            let note = service.update_note(id, title.as_deref(), content)?;
            println!("Updated note: {}", note.title);
        }
        NoteAction::Pin { id } => {
            let note = service.toggle_pin(id)?;
            let state = if note.is_pinned { "Pinned" } else { "Unpinned" };
            println!("{state}: {}", note.title);
        }
        NoteAction::Tag { id, tags } => {
            let note = service.set_note_tags(id, &parse_tag_list(&tags))?;
            println!("Tags for {}: {}", note.title, note.tags.join(", "));
        }
        NoteAction::Tags => {
            for tag in service.list_tags()? {
                println!("{tag}");
            }
        }
        NoteAction::Delete { id } => {
            service.delete_note(id)?;
            println!("Deleted note {id}.");
        }
    }
    Ok(())
}

pub fn focus(conn: &Connection, action: FocusAction) -> Result<()> {
    let service = FocusService::new(SqliteFocusSessionRepository::try_new(conn)?);
    match action {
        FocusAction::Run {
            mode,
            level,
            project,
            task,
        } => {
            let mut timer = FocusTimer::new(mode);
            timer.start();
            info!(
                "event=focus_run module=cli status=start mode={} secs={}",
                mode.as_str(),
                timer.time_left_secs
            );
            let mut stdout = std::io::stdout();
            loop {
                write!(stdout, "\r{} {} ", mode.label(), timer.display())?;
                stdout.flush()?;
                std::thread::sleep(Duration::from_secs(1));
                if timer.tick(1) {
                    break;
                }
            }
            writeln!(stdout, "\r{} {} done", mode.label(), format_clock(0))?;

            let mut record = SessionRecord::new(mode, true, level);
            record.project_id = project;
            record.task_id = task;
            let session = service.record_session(record)?;
            println!("Recorded session {}.", session.id);
        }
        FocusAction::Log {
            mode,
            interrupted,
            level,
            project,
            task,
            notes,
        } => {
            let mut record = SessionRecord::new(mode, !interrupted, level);
            record.project_id = project;
            record.task_id = task;
            record.notes = notes;
            let session = service.record_session(record)?;
            println!(
                "Recorded {} session of {} min: {}",
                session.mode.label(),
                session.duration_minutes,
                session.id
            );
        }
        FocusAction::History { project } => {
            for session in service.history(project)? {
                let outcome = if session.completed { "completed" } else { "interrupted" };
                println!(
                    "{}  {:<11} {:>3} min  focus {}/5  {}",
                    session.end_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    session.mode.label(),
                    session.duration_minutes,
                    session.focus_level,
                    outcome
                );
            }
        }
    }
    Ok(())
}

fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn format(file: Option<&Path>, json: bool) -> Result<()> {
    let text = read_text(file)?;
    let blocks = format_note(&text);
    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    } else {
        println!("{}", render_text(&blocks));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_date;

    #[test]
    fn parse_date_is_midnight_utc() {
        let parsed = parse_date("2024-05-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert!(parse_date("05/01/2024").is_err());
    }
}
