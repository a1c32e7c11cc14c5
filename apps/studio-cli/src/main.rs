//! Studio CLI - Story Studio
//!
//! Command-line interface for Story Studio: turns a story idea into a
//! research brief, a screenplay, an editorial verdict and storyboards.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use studio_core::config::{EXPORT_FILE_NAME, STATE_DIR};
use studio_core::{Session, Studio, StudioConfig, StudioError};
use tracing::{error, info};

mod tui;

/// Story Studio - idea to screenplay to storyboard
///
/// Runs a story through the research department, the writer's room, the
/// editor's desk and the art department.
#[derive(Parser)]
#[command(name = "studio", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Studio root directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available studio commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize a studio in the root directory
    ///
    /// Creates .studio/ with a default config.toml and an empty project
    /// database.
    Init {
        /// Overwrite an existing config.toml
        #[arg(long)]
        force: bool,
    },

    /// Start a project from an idea
    New {
        /// The story idea
        idea: String,
    },

    /// List projects, newest first
    List,

    /// Show a project and its current stage
    Show {
        /// Project id
        id: i64,
    },

    /// Run the research department
    Research {
        /// Project id
        id: i64,
    },

    /// Run the writer's room
    Write {
        /// Project id
        id: i64,

        /// Manager notes for the writer
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Run the editor's desk
    Review {
        /// Project id
        id: i64,
    },

    /// Send an unapproved script back to the writer and rewrite it
    Revise {
        /// Project id
        id: i64,

        /// Manager notes for the writer
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Run the art department on the approved script
    Storyboard {
        /// Project id
        id: i64,
    },

    /// Export the script to screenplay_final.txt
    Export {
        /// Project id
        id: i64,

        /// Directory to write into (defaults to the studio root)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Replace the research brief with edited text
    EditBrief {
        /// Project id
        id: i64,

        /// New brief text
        text: String,
    },

    /// List the prompt templates in use
    Prompts,

    /// Open the interactive studio
    Tui {
        /// Project to open on start
        #[arg(long)]
        project: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let root = match resolve_root(cli.dir.as_deref()) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // The TUI owns the terminal, so its logs go to a file
    let log_file = match &cli.command {
        Commands::Tui { .. } => Some(StudioConfig::new(root.clone()).log_file),
        _ => None,
    };
    if let Err(e) = init_tracing(cli.verbose, log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    // Execute command
    if let Err(e) = run_command(cli.command, &root).await {
        match e.downcast_ref::<StudioError>() {
            Some(studio_err) if studio_err.is_warning() => {
                info!("Command refused: {}", studio_err);
                eprintln!("Warning: {}", studio_err);
            }
            _ => {
                // Log with tracing
                error!("Command failed: {:#}", e);
                // Also print to stderr for CLI users
                eprintln!("Error: {:#}", e);
            }
        }
        if let Some(raw) = e
            .downcast_ref::<StudioError>()
            .and_then(StudioError::raw_response)
        {
            eprintln!("\nRaw editor response:\n{}", raw);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing subscriber for structured logging
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if verbose {
        EnvFilter::new("studio=debug,studio_core=debug,studio_pm=debug")
    } else {
        EnvFilter::new("studio=info,studio_core=info,studio_pm=info")
    };

    match log_file {
        Some(path) => {
            // An uninitialized studio has nowhere to log to
            if path.parent().is_some_and(|dir| !dir.exists()) {
                return Ok(());
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_level(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Execute the specified command
async fn run_command(command: Commands, root: &Path) -> Result<()> {
    match command {
        Commands::Init { force } => {
            info!("Initializing studio in {}", root.display());
            run_init(root, force)
        }
        Commands::New { idea } => run_new(root, &idea),
        Commands::List => run_list(root),
        Commands::Show { id } => run_show(root, id),
        Commands::Research { id } => {
            info!("Researching project {}", id);
            run_research(root, id).await
        }
        Commands::Write { id, notes } => {
            info!("Writing project {}", id);
            run_write(root, id, &notes).await
        }
        Commands::Review { id } => {
            info!("Reviewing project {}", id);
            run_review(root, id).await
        }
        Commands::Revise { id, notes } => {
            info!("Revising project {}", id);
            run_revise(root, id, &notes).await
        }
        Commands::Storyboard { id } => {
            info!("Storyboarding project {}", id);
            run_storyboard(root, id).await
        }
        Commands::Export { id, out } => run_export(root, id, out.as_deref()),
        Commands::EditBrief { id, text } => run_edit_brief(root, id, &text),
        Commands::Prompts => run_prompts(root),
        Commands::Tui { project } => {
            let studio = open_studio(root, false)?;
            tui::run_studio_tui(&studio, project)
                .await
                .context("Interactive studio failed")
        }
    }
}

/// Run the init command
fn run_init(root: &Path, force: bool) -> Result<()> {
    let config = StudioConfig::load(root.to_path_buf())
        .context("Failed to load existing studio configuration")?;

    let wrote = config
        .write_default(force)
        .context("Failed to write studio configuration")?;

    // Opening the runtime creates the database
    let studio = Studio::new(config).context("Failed to create studio runtime")?;

    println!("✔ Studio root: {}", root.display());
    if wrote {
        println!("✔ Generated default configuration");
    } else {
        println!("✔ Kept existing configuration (use --force to overwrite)");
    }
    println!("✔ Project database ready");
    if let Some(warning) = studio.init_warning() {
        println!("! Agents unavailable: {}", warning);
    }
    println!("\nStudio initialized!");
    println!("\nNext steps:");
    println!("  studio new \"<idea>\"    Start a project");
    println!("  studio tui             Open the interactive studio");

    Ok(())
}

/// Run the new command
fn run_new(root: &Path, idea: &str) -> Result<()> {
    let studio = open_studio(root, false)?;
    let session = studio.start_project(idea)?;

    println!(
        "✔ Created project {}: {}",
        session.project.id, session.project.name
    );
    print_stage(&session);
    println!("\nNext steps:");
    println!("  studio research {}    Run the research department", session.project.id);

    Ok(())
}

/// Run the list command
fn run_list(root: &Path) -> Result<()> {
    let studio = open_studio(root, false)?;
    let projects = studio.list_projects()?;

    if projects.is_empty() {
        println!("No projects yet. Start one with: studio new \"<idea>\"");
        return Ok(());
    }
    for summary in projects {
        println!("{}", summary);
    }

    Ok(())
}

/// Run the show command
fn run_show(root: &Path, id: i64) -> Result<()> {
    let studio = open_studio(root, false)?;
    let session = studio.open_project(id)?;
    let project = &session.project;

    println!("{}. {} ({})", project.id, project.name, project.created_at);
    print_stage(&session);

    print_section("Idea", &project.original_idea);
    print_section("Research brief", &project.research_brief);
    print_section("Script", &project.script_content);
    if project.has_been_reviewed() {
        println!("\n== Review ==");
        println!("Score: {}/10", project.editor_score);
        println!("Approved: {}", yes_no(project.is_approved));
        println!("Reviews: {}", project.review_count);
        println!("{}", project.editor_feedback);
    }
    print_section("Storyboard", &project.storyboard_output);

    Ok(())
}

/// Run the research command
async fn run_research(root: &Path, id: i64) -> Result<()> {
    let studio = open_studio(root, true)?;
    let mut session = studio.open_project(id)?;

    let brief = studio.run_research(&mut session).await?;

    println!("{}", brief);
    print_stage(&session);
    println!("\nNext steps:");
    println!("  studio write {} --notes \"...\"    Run the writer's room", id);

    Ok(())
}

/// Run the write command
async fn run_write(root: &Path, id: i64, notes: &str) -> Result<()> {
    let studio = open_studio(root, true)?;
    let mut session = studio.open_project(id)?;

    let script = studio.write_script(&mut session, notes).await?;

    println!("{}", script);
    print_stage(&session);
    println!("\nNext steps:");
    println!("  studio review {}    Run the editor's desk", id);

    Ok(())
}

/// Run the review command
async fn run_review(root: &Path, id: i64) -> Result<()> {
    let studio = open_studio(root, true)?;
    let mut session = studio.open_project(id)?;

    let verdict = studio.run_review(&mut session).await?;

    println!("Score: {}/10", verdict.score);
    println!("Approved: {}", yes_no(verdict.approved));
    println!("\n{}", verdict.critique);
    print_stage(&session);
    println!("\nNext steps:");
    if verdict.approved {
        println!("  studio storyboard {}    Run the art department", id);
        println!("  studio export {}        Export the script", id);
    } else {
        println!("  studio revise {} --notes \"...\"    Send back to the writer", id);
        println!("  studio review {}                  Ask for another review", id);
    }

    Ok(())
}

/// Run the revise command: send back and rewrite in one session
async fn run_revise(root: &Path, id: i64, notes: &str) -> Result<()> {
    let studio = open_studio(root, true)?;
    let mut session = studio.open_project(id)?;

    studio.send_back(&mut session)?;
    let script = studio.write_script(&mut session, notes).await?;

    println!("{}", script);
    print_stage(&session);
    println!("\nNext steps:");
    println!("  studio review {}    Run the editor's desk again", id);

    Ok(())
}

/// Run the storyboard command
async fn run_storyboard(root: &Path, id: i64) -> Result<()> {
    let studio = open_studio(root, true)?;
    let mut session = studio.open_project(id)?;

    let markdown = studio.generate_storyboard(&mut session).await?;

    println!("{}", markdown);
    print_stage(&session);

    Ok(())
}

/// Run the export command
fn run_export(root: &Path, id: i64, out: Option<&Path>) -> Result<()> {
    let studio = open_studio(root, false)?;
    let session = studio.open_project(id)?;

    let target = out.map(|dir| dir.join(EXPORT_FILE_NAME));
    let path = studio.export_script(&session, target.as_deref())?;

    println!("✔ Exported script to {}", path.display());

    Ok(())
}

/// Run the edit-brief command
fn run_edit_brief(root: &Path, id: i64, text: &str) -> Result<()> {
    let studio = open_studio(root, false)?;
    let mut session = studio.open_project(id)?;

    studio.edit_research_brief(&mut session, text)?;

    println!("✔ Research brief updated for project {}", id);

    Ok(())
}

/// Run the prompts command
fn run_prompts(root: &Path) -> Result<()> {
    let studio = open_studio(root, false)?;

    for name in studio.prompt_templates()? {
        println!("{}", name);
    }

    Ok(())
}

/// Resolve the studio root from `--dir` or the current directory
fn resolve_root(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

/// Load the configuration and build the runtime for an initialized studio
fn open_studio(root: &Path, needs_agents: bool) -> Result<Studio> {
    let studio_dir = root.join(STATE_DIR);
    if !studio_dir.exists() {
        anyhow::bail!(
            "Studio not initialized. Run 'studio init' first.\n\
             Expected directory: {}",
            studio_dir.display()
        );
    }

    let config =
        StudioConfig::load(root.to_path_buf()).context("Failed to load studio configuration")?;
    let studio = Studio::new(config).context("Failed to create studio runtime")?;

    if needs_agents && let Some(warning) = studio.init_warning() {
        eprintln!("Warning: {}", warning);
    }

    Ok(studio)
}

fn print_stage(session: &Session) {
    let derived = session.derived_stage();
    if session.stage == derived {
        println!("\nStage: {}", session.stage);
    } else {
        println!("\nStage: {} (stored: {})", session.stage, derived);
    }
    if session.can_send_back() {
        println!("Send-back available");
    }
}

fn print_section(title: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    println!("\n== {} ==", title);
    println!("{}", body);
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
