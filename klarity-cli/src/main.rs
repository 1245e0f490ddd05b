use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use klarity_core::{
    Assistant, AssistantReply, Board, ChatContext, EmailCategory, Inbox, convert_to_task, ghosts_added_message,
    today_in, GHOST_SCAN_CONTEXT,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod ai_worker;
mod board_ui;
mod config;
mod gemini;
mod inbox_cmd;
mod logging;
mod prompts;
mod setup;
mod state;

use config::Config;
use inbox_cmd::{CategoryArg, Edits, TabArg};
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "klarity",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KLARITY_BUILD_SHA"), ")"),
    about = "Klarity task board with an AI collaborator"
)]
struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Never call the live collaborator
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal board
    Board {
        /// JSON array of tasks to seed the board with
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// One assistant turn against the seeded board
    Chat {
        message: String,

        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Print AI-detected ghost task drafts
    Ghosts {
        /// Work context to scan (defaults to the built-in scan context)
        #[arg(long)]
        context: Option<String>,
    },

    /// Start-of-day brief as JSON
    Brief {
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Weekly insight report as JSON
    Report {
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Self-reflection draft as JSON
    Reflect {
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Summarize an email body into a task draft
    Email { file: PathBuf },

    /// Triage an inbox file and convert emails into tasks
    Inbox {
        /// JSON array of emails
        #[arg(long)]
        emails: PathBuf,

        /// Tab to list after the edits
        #[arg(long, value_enum, default_value_t = TabArg::Primary)]
        tab: TabArg,

        #[arg(long, value_name = "ID")]
        read: Vec<String>,

        #[arg(long, value_name = "ID")]
        archive: Vec<String>,

        #[arg(long, value_name = "ID")]
        restore: Vec<String>,

        #[arg(long, value_name = "ID")]
        delete: Vec<String>,

        /// Recategorize an email (also un-archives it)
        #[arg(long = "move", value_name = "ID", requires = "to")]
        move_id: Option<String>,

        #[arg(long, value_enum)]
        to: Option<CategoryArg>,

        /// Turn an email into a task on the board
        #[arg(long, value_name = "ID")]
        convert: Vec<String>,

        /// JSON array of tasks to seed the board with
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Save the edited emails back to the file
        #[arg(long)]
        write: bool,
    },

    /// One-time interactive profile setup
    Setup,

    /// Manage ~/.klarity/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn build_assistant(cfg: &Config, offline: bool) -> Result<Assistant> {
    if offline {
        info!("offline mode requested");
        return Ok(Assistant::offline());
    }
    match config::api_key_from_env() {
        Some(key) => {
            info!(model = %cfg.ai.model, "live collaborator");
            Ok(Assistant::new(gemini::GeminiCollaborator::new(&cfg.ai, Some(key))?))
        }
        None => {
            info!("no API key; using offline collaborator");
            Ok(Assistant::offline())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::Board { .. }) {
        state::ensure_klarity_home()?;
        logging::init_file(cli.log_level, &state::log_path()?)?;
    } else {
        logging::init_stderr(cli.log_level);
    }

    // These two repair the config, so they must not depend on reading it.
    match cli.command {
        Command::Setup => return setup::run_setup(),
        Command::Config { command: ConfigCommand::Init } => return config::init_config(),
        _ => {}
    }

    let cfg = config::load_config()?;
    let user = cfg.user();
    let today = today_in(&cfg.user.timezone);

    match cli.command {
        Command::Board { tasks } => {
            let assistant = Arc::new(build_assistant(&cfg, cli.offline)?);
            let board = Board::with_tasks(state::seed_tasks(tasks.as_deref())?);
            let app = board_ui::App::new(board, user, today);
            board_ui::run_board(app, assistant)?;
        }

        Command::Chat { message, tasks } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let mut board = Board::with_tasks(state::seed_tasks(tasks.as_deref())?);
            let ctx = ChatContext { tasks: board.tasks(), user: &user };
            match assistant.handle_message(&message, ctx).await {
                AssistantReply::Text(text) => println!("{}", text),
                AssistantReply::Ghosts(drafts) => {
                    let ids = board.add_ghost_tasks(drafts, Some(user.id.clone()), today);
                    println!("{}", ghosts_added_message(ids.len()));
                    for id in ids {
                        if let Some(t) = board.get(&id) {
                            println!("- {} ({})", t.title, t.priority.as_str());
                        }
                    }
                }
            }
        }

        Command::Ghosts { context } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let context = context.unwrap_or_else(|| GHOST_SCAN_CONTEXT.to_string());
            print_json(&assistant.generate_ghost_tasks(&context).await)?;
        }

        Command::Brief { tasks } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let tasks = state::seed_tasks(tasks.as_deref())?;
            print_json(&assistant.generate_morning_brief(&tasks, &user).await)?;
        }

        Command::Report { tasks } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let tasks = state::seed_tasks(tasks.as_deref())?;
            print_json(&assistant.generate_weekly_report(&tasks, &user).await)?;
        }

        Command::Reflect { tasks } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let tasks = state::seed_tasks(tasks.as_deref())?;
            print_json(&assistant.generate_reflection_draft(&tasks, &user).await)?;
        }

        Command::Email { file } => {
            let assistant = build_assistant(&cfg, cli.offline)?;
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let summary = assistant.summarize_email_for_task(&body).await;
            let mut board = Board::new();
            let id = board.allocate_id("t-email");
            print_json(&convert_to_task(id, &summary, Some(user.id.clone()), today))?;
        }

        Command::Inbox {
            emails,
            tab,
            read,
            archive,
            restore,
            delete,
            move_id,
            to,
            convert,
            tasks,
            write,
        } => {
            let mut inbox = Inbox::new(state::read_emails(&emails)?);
            let edits = Edits {
                read,
                archive,
                restore,
                delete,
                moves: move_id.zip(to).map(|(id, c)| (id, EmailCategory::from(c))).into_iter().collect(),
            };
            inbox_cmd::apply_edits(&mut inbox, &edits);

            if !convert.is_empty() {
                let assistant = build_assistant(&cfg, cli.offline)?;
                let mut board = Board::with_tasks(state::seed_tasks(tasks.as_deref())?);
                let ids =
                    inbox_cmd::convert_emails(&mut inbox, &mut board, &assistant, &convert, &user, today).await;
                let created: Vec<_> = ids.iter().filter_map(|id| board.get(id)).collect();
                print_json(&created)?;
            }

            print!("{}", inbox_cmd::render_tab(&inbox, tab.into()));
            if write && (!edits.is_empty() || !convert.is_empty()) {
                state::write_emails(&emails, inbox.emails())?;
                info!(path = %emails.display(), "saved inbox");
            }
        }

        // Handled before the config is loaded.
        Command::Setup | Command::Config { command: ConfigCommand::Init } => {}

        Command::Config { command: ConfigCommand::Show } => {
            println!("# {}", config::config_path()?.display());
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_flags_parse() {
        let cli = Cli::try_parse_from([
            "klarity", "inbox", "--emails", "mail.json", "--tab", "later", "--convert", "e1",
            "--convert", "e2", "--move", "e3", "--to", "other",
        ])
        .unwrap();
        match cli.command {
            Command::Inbox { tab, convert, move_id, to, write, .. } => {
                assert_eq!(tab, TabArg::Later);
                assert_eq!(convert, vec!["e1".to_string(), "e2".to_string()]);
                assert_eq!(move_id.as_deref(), Some("e3"));
                assert_eq!(to, Some(CategoryArg::Other));
                assert!(!write);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn move_needs_a_target() {
        assert!(Cli::try_parse_from(["klarity", "inbox", "--emails", "m.json", "--move", "e1"]).is_err());
    }
}
