//! Command-line surface definitions.

use clap::{Args, Parser, Subcommand};
use jayamesh_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use jayamesh_core::{FocusMode, ProjectStatus, TaskStatus};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "jayamesh")]
#[command(about = "Local project planner: projects, sections, goals, tasks and notes")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    pub db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    pub log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the store and insert the sample project when empty
    Init,

    /// Show overview statistics
    Stats,

    /// Show storage paths, schema version and row counts
    Info,

    /// Backup, restore and maintenance
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Project operations
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Section operations
    Section {
        #[command(subcommand)]
        action: SectionAction,
    },

    /// Goal operations
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Task operations
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Note operations
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Focus timer and session history
    Focus {
        #[command(subcommand)]
        action: FocusAction,
    },

    /// Render note markup from a file, or stdin when omitted
    Format {
        file: Option<PathBuf>,

        /// Print render directives as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a JSON backup
    Export {
        /// Output file (default: jayamesh-backup-YYYY-MM-DD.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace the whole store with a JSON backup
    Import { file: PathBuf },

    /// Delete every record, keeping the schema
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Recreate the schema and reinsert the sample project
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,
    },

    /// Create a project
    Add {
        title: String,

        /// Project kind (game, web, mobile, ...)
        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,

        #[arg(short, long)]
        priority: Option<u8>,

        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Change project status
    Status {
        id: Uuid,

        #[arg(value_parser = parse_project_status)]
        status: ProjectStatus,
    },

    /// Archive a project (or restore it with --undo)
    Archive {
        id: Uuid,

        #[arg(long)]
        undo: bool,
    },

    /// Delete a project and everything it owns
    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum SectionAction {
    /// List a project's sections
    List { project: Uuid },

    /// Append a section to a project
    Add {
        project: Uuid,
        name: String,

        #[arg(long = "type")]
        kind: Option<String>,
    },

    /// Rename a section
    Rename { id: Uuid, name: String },

    /// Delete a section with its goals, tasks and notes
    Delete { id: Uuid },
}

/// Ownership filter shared by list commands.
#[derive(Args)]
pub struct ScopeArgs {
    #[arg(long, conflicts_with = "section")]
    pub project: Option<Uuid>,

    #[arg(long)]
    pub section: Option<Uuid>,
}

#[derive(Subcommand)]
pub enum GoalAction {
    List {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Create a goal in a section
    Add {
        section: Uuid,
        title: String,

        #[arg(short, long, default_value = "1")]
        target: f64,

        /// Deadline as YYYY-MM-DD (default: one week from now)
        #[arg(long, value_parser = crate::commands::parse_date)]
        deadline: Option<chrono::DateTime<chrono::Utc>>,

        #[arg(short, long)]
        priority: Option<u8>,
    },

    /// Record progress towards a goal
    Progress { id: Uuid, value: f64 },

    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum TaskAction {
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Group by status columns
        #[arg(long)]
        board: bool,
    },

    /// Create a task in a section
    Add {
        section: Uuid,
        title: String,

        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(short, long)]
        priority: Option<u8>,

        /// Link to a goal of the same section
        #[arg(long)]
        goal: Option<Uuid>,

        #[arg(long)]
        recurring: bool,

        /// Due date as YYYY-MM-DD (default: in two days)
        #[arg(long, value_parser = crate::commands::parse_date)]
        due: Option<chrono::DateTime<chrono::Utc>>,

        /// Estimated hours
        #[arg(long)]
        hours: Option<f64>,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Capture a task into the project's first section
    Capture { project: Uuid, title: String },

    /// Change task status
    Status {
        id: Uuid,

        #[arg(value_parser = parse_task_status)]
        status: TaskStatus,
    },

    /// Toggle between todo and done
    Toggle { id: Uuid },

    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum NoteAction {
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Case-insensitive filter over title, content and tags
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a note in a section
    Add {
        section: Uuid,
        title: String,

        #[arg(short, long, default_value = "", conflicts_with = "file")]
        content: String,

        /// Read content from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// Print a note with formatting applied
    Show { id: Uuid },

    /// Replace a note's title and/or content
    Edit {
        id: Uuid,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Toggle the pinned flag
    Pin { id: Uuid },

    /// Replace a note's tags with a comma-separated list
    Tag { id: Uuid, tags: String },

    /// List all known tags
    Tags,

    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum FocusAction {
    /// Run the timer in the terminal and record the session when it ends
    Run {
        #[arg(short, long, default_value = "pomodoro", value_parser = parse_focus_mode)]
        mode: FocusMode,

        /// Focus level 1..=5 recorded with the session
        #[arg(short, long, default_value = "3")]
        level: u8,

        #[arg(long)]
        project: Option<Uuid>,

        #[arg(long)]
        task: Option<Uuid>,
    },

    /// Record a finished session without running the timer
    Log {
        #[arg(value_parser = parse_focus_mode)]
        mode: FocusMode,

        /// The session was cut short
        #[arg(long)]
        interrupted: bool,

        #[arg(short, long, default_value = "3")]
        level: u8,

        #[arg(long)]
        project: Option<Uuid>,

        #[arg(long)]
        task: Option<Uuid>,

        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List recorded sessions
    History {
        #[arg(long)]
        project: Option<Uuid>,
    },
}

fn parse_project_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value)
        .ok_or_else(|| format!("expected planning|active|paused|completed, got `{value}`"))
}

fn parse_task_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value)
        .ok_or_else(|| format!("expected todo|in-progress|review|done, got `{value}`"))
}

fn parse_focus_mode(value: &str) -> Result<FocusMode, String> {
    FocusMode::parse(value)
        .ok_or_else(|| format!("expected pomodoro|shortBreak|longBreak|deepWork, got `{value}`"))
}
