//! Submit command implementation.
//!
//! The sample is checked against the class parameters the service reports
//! before anything is sent, so a bad sample never reaches the ledger. When
//! the service is unreachable the course defaults stand in, and the student
//! still sees their interval.

use crate::cli::SubmitArgs;
use crate::config::Profile;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use coverlab_domain::{
    process_submission, ConfidenceLevel, IntervalResult, PopulationParameters,
};
use coverlab_sdk::{ClassroomClient, SdkError, SubmitOutcome};
use std::time::Duration;

/// First reconnect delay; doubles on each attempt
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Parameters a sample is checked against before sending
#[derive(Debug, Clone, Copy)]
struct ClassParameters {
    params: PopulationParameters,
    /// False when the service hides μ, so a local capture verdict means nothing
    mean_known: bool,
}

/// Execute the submit command.
pub async fn execute_submit(
    args: SubmitArgs,
    client: &ClassroomClient,
    profile: &Profile,
    formatter: &Formatter,
) -> Result<()> {
    let student_id = resolve_student_id(args.id.as_deref(), profile.student_id.as_deref())?;
    let raw = args.source.read()?;

    let class = class_parameters(client, formatter).await?;
    let local = process_submission(&class.params, &student_id, &raw, args.level)?;
    let preview = class.mean_known.then_some(local.result);
    if let Some(result) = &preview {
        println!("{}", formatter.format_interval(local.sample.student_id(), result)?);
    }

    let outcome = match submit_with_retry(client, &student_id, &raw, args.level, args.retries, formatter).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_transient() => {
            eprintln!(
                "{}",
                formatter.warning(&format!(
                    "Could not reach {}. Your sample was not recorded; submit again when the service is back.",
                    client.endpoint()
                ))
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    report_outcome(preview.as_ref(), outcome, formatter)
}

/// Ask the service for its parameters, falling back to the course defaults
/// only when it cannot be reached
async fn class_parameters(client: &ClassroomClient, formatter: &Formatter) -> Result<ClassParameters> {
    match client.parameters().await {
        Ok(remote) => Ok(ClassParameters {
            params: remote.to_population()?,
            mean_known: remote.population_mean.is_some(),
        }),
        Err(e) if e.is_transient() => {
            eprintln!(
                "{}",
                formatter.warning(&format!(
                    "Could not fetch class parameters from {} ({}); checking against the course defaults",
                    client.endpoint(),
                    e
                ))
            );
            Ok(ClassParameters {
                params: PopulationParameters::default(),
                mean_known: true,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Pick the explicit `--id`, else the profile's default
fn resolve_student_id(explicit: Option<&str>, profile_default: Option<&str>) -> Result<String> {
    explicit
        .or(profile_default)
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::InvalidInput(
                "provide --id or set a student_id on the active profile".to_string(),
            )
        })
}

async fn submit_with_retry(
    client: &ClassroomClient,
    student_id: &str,
    raw: &str,
    level: ConfidenceLevel,
    retries: u32,
    formatter: &Formatter,
) -> std::result::Result<SubmitOutcome, SdkError> {
    let mut attempt = 0;
    loop {
        match client.submit(student_id, raw, level).await {
            // Timeouts are not retried; the first request may already be recorded
            Err(SdkError::ConnectionError(_)) if attempt < retries => {
                attempt += 1;
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                eprintln!(
                    "{}",
                    formatter.warning(&format!(
                        "Service unreachable, reconnecting ({}/{}) in {}s...",
                        attempt,
                        retries,
                        delay.as_secs()
                    ))
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

fn report_outcome(
    preview: Option<&IntervalResult>,
    outcome: SubmitOutcome,
    formatter: &Formatter,
) -> Result<()> {
    let server: IntervalResult = outcome.result.try_into()?;
    match preview {
        Some(local) if same_interval(local, &server) => {}
        Some(_) => {
            eprintln!(
                "{}",
                formatter.info("The service uses different class parameters; its result is the one recorded:")
            );
            println!("{}", formatter.format_interval(&outcome.record.student_id, &server)?);
        }
        None => {
            println!("{}", formatter.format_interval(&outcome.record.student_id, &server)?);
        }
    }

    if outcome.persisted {
        eprintln!("{}", formatter.success("Recorded with the class"));
    } else {
        let reason = outcome
            .ledger_error
            .unwrap_or_else(|| "unknown reason".to_string());
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Computed, but the class ledger is unavailable ({}). Reconnecting... submit again in a moment.",
                reason
            ))
        );
    }

    Ok(())
}

fn same_interval(a: &IntervalResult, b: &IntervalResult) -> bool {
    const EPS: f64 = 1e-9;
    a.confidence_level == b.confidence_level
        && (a.lower_bound - b.lower_bound).abs() < EPS
        && (a.upper_bound - b.upper_bound).abs() < EPS
        && a.captures_mean == b.captures_mean
}
