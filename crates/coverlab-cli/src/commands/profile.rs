//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, OutputFormat, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
pub async fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, name, formatter),
        ProfileAction::Set {
            name,
            url,
            student_id,
        } => set_profile(config, name, url, student_id, formatter),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter),
    }
}

fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    println!(
        "{}",
        formatter.format_profiles(&config.profiles, &config.active_profile)?
    );
    Ok(())
}

fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;
    println!(
        "{}",
        formatter.format_profiles([(&config.active_profile, profile)], &config.active_profile)?
    );
    if profile.student_id.is_none() && formatter.format() == OutputFormat::Table {
        eprintln!(
            "{}",
            formatter.info("No default student ID; pass --id to submit or set one with `profile set -s`")
        );
    }
    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(
    config: &mut Config,
    name: String,
    url: String,
    student_id: Option<String>,
    formatter: &Formatter,
) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidInput(format!(
            "service URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    let student_id = student_id.filter(|id| !id.trim().is_empty());

    let verb = match config.profiles.contains_key(&name) {
        true => "Updated",
        false => "Created",
    };
    config.set_profile(
        name.clone(),
        Profile {
            router_url: url.trim_end_matches('/').to_string(),
            student_id,
        },
    );
    config.save()?;

    println!("{}", formatter.success(&format!("{} profile '{}'", verb, name)));
    Ok(())
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_none() {
        return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
    }
    config.save()?;

    println!("{}", formatter.success(&format!("Deleted profile '{}'", name)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config(dir: &TempDir) -> Config {
        Config::default().with_location(&dir.path().join("config.toml"))
    }

    #[test]
    fn test_set_and_switch_profile() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        // Set a new profile
        set_profile(
            &mut config,
            "test".to_string(),
            "http://localhost:8080/".to_string(),
            Some("ana".to_string()),
            &formatter,
        )
        .unwrap();

        assert_eq!(config.profiles["test"].router_url, "http://localhost:8080");
        assert_eq!(config.profiles["test"].student_id.as_deref(), Some("ana"));

        // Switch to it
        switch_profile(&mut config, "test".to_string(), &formatter).unwrap();
        assert_eq!(config.active_profile, "test");
    }

    #[test]
    fn test_set_rejects_non_http_url() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        let result = set_profile(
            &mut config,
            "bad".to_string(),
            "localhost:8080".to_string(),
            None,
            &formatter,
        );
        assert!(result.is_err());
        assert!(!config.profiles.contains_key("bad"));
    }

    #[test]
    fn test_delete_active_profile() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        let result = delete_profile(&mut config, "default".to_string(), &formatter);
        assert!(matches!(result, Err(CliError::NotPermitted(_))));
        assert!(delete_profile(&mut config, "missing".to_string(), &formatter).is_err());
    }

    #[test]
    fn test_delete_other_profile_persists() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        set_profile(
            &mut config,
            "aula".to_string(),
            "http://10.0.0.5:8080".to_string(),
            None,
            &formatter,
        )
        .unwrap();
        delete_profile(&mut config, "aula".to_string(), &formatter).unwrap();

        let reloaded = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(!reloaded.profiles.contains_key("aula"));
    }
}
