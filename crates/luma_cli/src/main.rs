//! Command-line front end for `luma_core`.
//!
//! # Responsibility
//! - Map subcommands onto store, calendar, theme and identity operations.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! # See also
//! - `luma_core::config` for the environment variables read at startup.

use clap::{Args, Parser, Subcommand};
use luma_core::calendar::{add_weeks, day_name, format_date, is_today, parse_date};
use luma_core::{
    check_access, init_logging_from_config, AppConfig, AuthError, LumaContext, Note, NotePatch,
    Project, RouteDecision, Task, TaskPatch, WeekView,
};
use log::warn;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "luma", version, about = "Local tasks, projects and notes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Task operations.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Project operations.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Note operations.
    #[command(subcommand)]
    Note(NoteCommand),
    /// Show tasks for a Sunday-to-Saturday week.
    Week(WeekArgs),
    /// Show or cycle the color theme.
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Sign in, sign up, sign out or inspect the session.
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Print `pong` and the core version.
    Ping,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task.
    Add(TaskAddArgs),
    /// List tasks, optionally filtered by date or project.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Mark a task completed.
    Done { id: String },
    /// Mark a task not completed.
    Reopen { id: String },
    /// Delete a task.
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Args, Debug)]
struct TaskAddArgs {
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// ISO date, `YYYY-MM-DD`.
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    project: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    #[command(alias = "ls")]
    List,
    /// Delete a project and detach its tasks.
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum NoteCommand {
    Add {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    #[command(alias = "ls")]
    List,
    /// Replace a note's title or body.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Link a note to a project or task.
    Tag(NoteTagArgs),
    /// Unlink a note from a project or task.
    Untag(NoteTagArgs),
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Args, Debug)]
struct NoteTagArgs {
    id: String,
    #[arg(long, conflicts_with = "task", required_unless_present = "task")]
    project: Option<String>,
    #[arg(long)]
    task: Option<String>,
}

#[derive(Args, Debug)]
struct WeekArgs {
    /// Any date inside the week; defaults to today.
    #[arg(long)]
    date: Option<String>,
    /// Weeks to move forward (negative moves back).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    Show {
        #[arg(long)]
        prefers_dark: bool,
    },
    Cycle {
        #[arg(long)]
        prefers_dark: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    Login {
        email: String,
        #[arg(long, env = "LUMA_PASSWORD")]
        password: String,
    },
    Signup {
        name: String,
        email: String,
        #[arg(long, env = "LUMA_PASSWORD")]
        password: String,
    },
    Logout,
    /// Resolve the current session and print the route decision.
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("luma: logging disabled: {err}");
    }

    let mut context = LumaContext::bootstrap(&config);
    match run(cli.command, &mut context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("luma: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, context: &mut LumaContext) -> Result<(), String> {
    match command {
        Commands::Task(command) => run_task(command, context),
        Commands::Project(command) => run_project(command, context),
        Commands::Note(command) => run_note(command, context),
        Commands::Week(args) => run_week(args, context),
        Commands::Theme(command) => {
            run_theme(command, context);
            Ok(())
        }
        Commands::Auth(command) => run_auth(command, context).await,
        Commands::Ping => {
            println!("luma_core ping={}", luma_core::ping());
            println!("luma_core version={}", luma_core::core_version());
            Ok(())
        }
    }
}

fn run_task(command: TaskCommand, context: &mut LumaContext) -> Result<(), String> {
    let store = &mut context.store;
    match command {
        TaskCommand::Add(args) => {
            if let Some(date) = args.date.as_deref() {
                parse_date(date).map_err(|err| format!("invalid --date `{date}`: {err}"))?;
            }
            let task = store.create_task(args.title, args.description, args.date, args.project);
            println!("{}", task.id);
        }
        TaskCommand::List { date, project } => {
            let mut tasks = match (date.as_deref(), project.as_deref()) {
                (Some(date), _) => store.get_tasks_by_date(date),
                (None, Some(project)) => store.get_tasks_by_project(project),
                (None, None) => store.tasks().to_vec(),
            };
            if let (Some(_), Some(project)) = (date.as_deref(), project.as_deref()) {
                tasks.retain(|task| task.project_id.as_deref() == Some(project));
            }
            tasks.iter().for_each(print_task);
        }
        TaskCommand::Done { id } => {
            require(store.get_task_by_id(&id), "task", &id)?;
            store.update_task(&id, TaskPatch::completed(true));
        }
        TaskCommand::Reopen { id } => {
            require(store.get_task_by_id(&id), "task", &id)?;
            store.update_task(&id, TaskPatch::completed(false));
        }
        TaskCommand::Delete { id } => {
            require(store.get_task_by_id(&id), "task", &id)?;
            store.delete_task(&id);
        }
    }
    Ok(())
}

fn run_project(command: ProjectCommand, context: &mut LumaContext) -> Result<(), String> {
    let store = &mut context.store;
    match command {
        ProjectCommand::Add { name, description } => {
            let project = store.create_project(name, description);
            println!("{}", project.id);
        }
        ProjectCommand::List => store.projects().iter().for_each(print_project),
        ProjectCommand::Delete { id } => {
            require(store.get_project_by_id(&id), "project", &id)?;
            store.delete_project(&id);
        }
    }
    Ok(())
}

fn run_note(command: NoteCommand, context: &mut LumaContext) -> Result<(), String> {
    let store = &mut context.store;
    match command {
        NoteCommand::Add { title, body } => {
            let note = store.create_note(title, body);
            println!("{}", note.id);
        }
        NoteCommand::List => store.notes().iter().for_each(print_note),
        NoteCommand::Edit { id, title, body } => {
            require(store.get_note_by_id(&id), "note", &id)?;
            store.update_note(
                &id,
                NotePatch {
                    title,
                    body,
                    ..NotePatch::default()
                },
            );
        }
        NoteCommand::Tag(args) => {
            require(store.get_note_by_id(&args.id), "note", &args.id)?;
            match (args.project, args.task) {
                (Some(project), _) => store.tag_note_to_project(&args.id, &project),
                (None, Some(task)) => store.tag_note_to_task(&args.id, &task),
                (None, None) => return Err("expected --project or --task".to_string()),
            }
        }
        NoteCommand::Untag(args) => {
            require(store.get_note_by_id(&args.id), "note", &args.id)?;
            match (args.project, args.task) {
                (Some(project), _) => store.untag_note_from_project(&args.id, &project),
                (None, Some(task)) => store.untag_note_from_task(&args.id, &task),
                (None, None) => return Err("expected --project or --task".to_string()),
            }
        }
        NoteCommand::Delete { id } => {
            require(store.get_note_by_id(&id), "note", &id)?;
            store.delete_note(&id);
        }
    }
    Ok(())
}

fn run_week(args: WeekArgs, context: &LumaContext) -> Result<(), String> {
    let anchor = match args.date.as_deref() {
        Some(date) => WeekView::containing(
            parse_date(date).map_err(|err| format!("invalid --date `{date}`: {err}"))?,
        ),
        None => WeekView::current(),
    };
    let week = WeekView::containing(add_weeks(anchor.start_date, args.offset));

    println!("{}", week.label());
    for day in context.store.tasks_for_week(&week) {
        let marker = if is_today(day.date) { " (today)" } else { "" };
        println!("{} {}{marker}", day_name(day.date), format_date(day.date));
        for task in &day.tasks {
            print!("  ");
            print_task(task);
        }
    }
    Ok(())
}

fn run_theme(command: ThemeCommand, context: &LumaContext) {
    let theme = match command {
        ThemeCommand::Show { prefers_dark } => context.theme.resolve_initial_theme(prefers_dark),
        ThemeCommand::Cycle { prefers_dark } => context.theme.cycle(prefers_dark),
    };
    println!("{} ({})", theme.id, theme.label);
}

async fn run_auth(command: AuthCommand, context: &LumaContext) -> Result<(), String> {
    let identity = &context.identity;
    match command {
        AuthCommand::Login { email, password } => {
            identity
                .sign_in(&email, &password)
                .await
                .map_err(describe_auth_error)?;
            println!("signed in as {email}");
        }
        AuthCommand::Signup {
            name,
            email,
            password,
        } => {
            identity
                .sign_up(&name, &email, &password)
                .await
                .map_err(describe_auth_error)?;
            println!("registered {email}; confirm the account before signing in");
        }
        AuthCommand::Logout => {
            identity.sign_out().await.map_err(describe_auth_error)?;
            println!("signed out");
        }
        AuthCommand::Status => {
            let authenticated = identity.is_authenticated().await;
            if !identity.is_configured() {
                warn!("event=cli_auth_status module=cli status=skip reason=not_configured");
            }
            let email = identity.get_stored_user_email();
            println!(
                "authenticated={authenticated} email={}",
                email.as_deref().unwrap_or("-")
            );
            match check_access(&context.storage) {
                RouteDecision::Allow => println!("route=allow"),
                RouteDecision::Redirect(target) => println!("route=redirect:{target}"),
            }
        }
    }
    Ok(())
}

fn describe_auth_error(err: AuthError) -> String {
    match err.provider_error() {
        Some(reason) => {
            warn!(
                "event=cli_auth module=cli status=error error_code={}",
                reason.code
            );
            format!("{err} ({})", reason.code)
        }
        None => err.to_string(),
    }
}

fn require<T>(found: Option<T>, kind: &str, id: &str) -> Result<T, String> {
    found.ok_or_else(|| format!("no {kind} with id `{id}`"))
}

fn print_task(task: &Task) {
    let mark = if task.completed { 'x' } else { ' ' };
    println!(
        "[{mark}] {} {} date={} project={}",
        task.id,
        task.title,
        task.date.as_deref().unwrap_or("-"),
        task.project_id.as_deref().unwrap_or("-")
    );
}

fn print_project(project: &Project) {
    println!("{} {}", project.id, project.name);
}

fn print_note(note: &Note) {
    println!(
        "{} {} projects={} tasks={}",
        note.id,
        note.title,
        note.project_ids.join(","),
        note.task_ids.join(",")
    );
}
