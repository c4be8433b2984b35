//! Coverlab CLI - submit samples and watch the class's intervals capture μ.

use clap::Parser;
use coverlab_cli::commands;
use coverlab_cli::repl;
use coverlab_cli::{Cli, Command, Config, Formatter};
use coverlab_sdk::ClassroomClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> coverlab_cli::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|_| {
            let cfg = Config::default();
            cfg.save().ok();
            cfg
        }),
    };

    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&mut config, &formatter).await?;
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, &mut config, &formatter).await?;
        }
        Some(Command::Compute(args)) => {
            commands::execute_compute(args, &formatter)?;
        }
        Some(cmd) => {
            // Commands that talk to the classroom service
            let profile = config.get_active_profile()?;
            let client = ClassroomClient::new(&profile.router_url)?;

            match cmd {
                Command::Submit(args) => {
                    commands::execute_submit(args, &client, profile, &formatter).await?;
                }
                Command::Results => commands::execute_results(&client, &formatter).await?,
                Command::Summary => commands::execute_summary(&client, &formatter).await?,
                Command::Params => commands::execute_params(&client, &formatter).await?,
                Command::Repl | Command::Profile(_) | Command::Compute(_) => {}
            }
        }
    }

    Ok(())
}
