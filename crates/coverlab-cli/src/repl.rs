//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! The session remembers the student ID and confidence level so a student
//! can set them once and then submit several samples in a row.

use crate::cli::{
    parse_level, Command, ComputeArgs, PopulationOverrides, ProfileAction, ProfileArgs, SubmitArgs,
    ValuesSource,
};
use crate::commands;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use coverlab_domain::ConfidenceLevel;
use coverlab_sdk::ClassroomClient;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Reconnect attempts for submissions made from the REPL
const REPL_SUBMIT_RETRIES: u32 = 3;

/// Per-session state
#[derive(Debug, Default)]
struct Session {
    student_id: Option<String>,
    level: ConfidenceLevel,
    client: Option<ClassroomClient>,
}

impl Session {
    fn prompt(&self) -> String {
        match &self.student_id {
            Some(id) => format!("coverlab [{} @ {}]> ", id, self.level.label()),
            None => format!("coverlab [{}]> ", self.level.label()),
        }
    }

    /// Client for the active profile, built on first use
    fn client(&mut self, config: &Config) -> Result<&ClassroomClient> {
        if self.client.is_none() {
            let profile = config.get_active_profile()?;
            self.client = Some(ClassroomClient::new(&profile.router_url)?);
        }
        self.client
            .as_ref()
            .ok_or_else(|| CliError::Config("no classroom service configured".to_string()))
    }
}

/// Run the interactive REPL.
pub async fn run_repl(config: &mut Config, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.info("Coverlab REPL - Type 'help' for commands, 'exit' to quit"));
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)
        .map_err(|e| std::io::Error::other(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize editor: {}", e)))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut session = Session {
        student_id: config.get_active_profile().ok().and_then(|p| p.student_id.clone()),
        ..Session::default()
    };

    loop {
        match editor.readline(&session.prompt()) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(ReplCommand::SetId(id)) => {
                        println!("{}", formatter.success(&format!("Student ID set to '{}'", id)));
                        session.student_id = Some(id);
                    }
                    Ok(ReplCommand::SetLevel(level)) => {
                        session.level = level;
                        println!(
                            "{}",
                            formatter.success(&format!("Confidence level set to {}", level.label()))
                        );
                    }
                    Ok(ReplCommand::Command(cmd)) => {
                        if let Err(e) = execute_repl_command(cmd, &mut session, config, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug)]
enum ReplCommand {
    Exit,
    Help,
    SetId(String),
    SetLevel(ConfidenceLevel),
    Command(Command),
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "id" => parse_id_command(rest),
        "level" => parse_level_command(rest),
        "submit" => parse_submit_command(rest),
        "compute" => parse_compute_command(rest),
        "results" => Ok(ReplCommand::Command(Command::Results)),
        "summary" => Ok(ReplCommand::Command(Command::Summary)),
        "params" => Ok(ReplCommand::Command(Command::Params)),
        "profile" => parse_profile_command(rest),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            head
        ))),
    }
}

/// Execute a REPL command.
async fn execute_repl_command(
    cmd: Command,
    session: &mut Session,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        Command::Profile(args) => {
            let switches = matches!(args.action, ProfileAction::Switch { .. });
            commands::execute_profile(args, config, formatter).await?;
            if switches {
                session.client = None;
                if let Some(id) = config.get_active_profile()?.student_id.clone() {
                    session.student_id = Some(id);
                }
            }
        }
        Command::Compute(mut args) => {
            if let Some(id) = &session.student_id {
                args.id = id.clone();
            }
            args.level = session.level;
            commands::execute_compute(args, formatter)?;
        }
        Command::Submit(mut args) => {
            args.id = session.student_id.clone();
            args.level = session.level;
            let profile = config.get_active_profile()?.clone();
            let client = session.client(config)?;
            commands::execute_submit(args, client, &profile, formatter).await?;
        }
        Command::Results => {
            let client = session.client(config)?;
            commands::execute_results(client, formatter).await?;
        }
        Command::Summary => {
            let client = session.client(config)?;
            commands::execute_summary(client, formatter).await?;
        }
        Command::Params => {
            let client = session.client(config)?;
            commands::execute_params(client, formatter).await?;
        }
        Command::Repl => {
            println!("{}", formatter.info("Already in REPL mode"));
        }
    }

    Ok(())
}

fn parse_id_command(rest: &str) -> Result<ReplCommand> {
    if rest.is_empty() {
        return Err(CliError::InvalidInput("Usage: id <name>".to_string()));
    }
    Ok(ReplCommand::SetId(rest.to_string()))
}

fn parse_level_command(rest: &str) -> Result<ReplCommand> {
    if rest.is_empty() {
        return Err(CliError::InvalidInput("Usage: level <90|95|99>".to_string()));
    }
    parse_level(rest)
        .map(ReplCommand::SetLevel)
        .map_err(CliError::InvalidInput)
}

fn parse_submit_command(rest: &str) -> Result<ReplCommand> {
    if rest.is_empty() {
        return Err(CliError::InvalidInput("Usage: submit <values...>".to_string()));
    }
    // id and level come from the session at execution time
    Ok(ReplCommand::Command(Command::Submit(SubmitArgs {
        id: None,
        source: ValuesSource::inline(rest),
        level: ConfidenceLevel::default(),
        retries: REPL_SUBMIT_RETRIES,
    })))
}

fn parse_compute_command(rest: &str) -> Result<ReplCommand> {
    if rest.is_empty() {
        return Err(CliError::InvalidInput("Usage: compute <values...>".to_string()));
    }
    Ok(ReplCommand::Command(Command::Compute(ComputeArgs {
        id: "local".to_string(),
        source: ValuesSource::inline(rest),
        level: ConfidenceLevel::default(),
        population: PopulationOverrides::default(),
    })))
}

fn parse_profile_command(rest: &str) -> Result<ReplCommand> {
    let args: Vec<&str> = rest.split_whitespace().collect();
    if args.is_empty() {
        return Ok(ReplCommand::Command(Command::Profile(ProfileArgs {
            action: ProfileAction::Show,
        })));
    }

    let action = match args[0] {
        "list" => ProfileAction::List,
        "show" => ProfileAction::Show,
        "switch" => {
            if args.len() < 2 {
                return Err(CliError::InvalidInput("Usage: profile switch <name>".to_string()));
            }
            ProfileAction::Switch {
                name: args[1].to_string(),
            }
        }
        _ => return Err(CliError::InvalidInput(format!("Unknown profile action: {}", args[0]))),
    };

    Ok(ReplCommand::Command(Command::Profile(ProfileArgs { action })))
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  id <name>                      - Set your student ID for this session");
    println!("  level <90|95|99>               - Set the confidence level (default: 95)");
    println!("  submit <values...>             - Compute your interval and record it");
    println!("  compute <values...>            - Compute an interval without recording it");
    println!("    values: separated by commas, spaces or both");
    println!("  results                        - List every recorded interval");
    println!("  summary                        - Show how many intervals captured μ");
    println!("  params                         - Show the exercise parameters");
    println!("  profile [list|show|switch]     - Manage profiles");
    println!("  help, ?                        - Show this help");
    println!("  exit, quit, q                  - Exit REPL");
    println!();
}
