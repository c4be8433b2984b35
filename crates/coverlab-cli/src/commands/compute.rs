//! Compute command implementation.

use crate::cli::ComputeArgs;
use crate::error::Result;
use crate::output::Formatter;
use coverlab_domain::process_submission;

/// Execute the compute command. Never contacts the service; classes whose
/// parameters differ from the course defaults pass them as overrides.
pub fn execute_compute(args: ComputeArgs, formatter: &Formatter) -> Result<()> {
    let params = args.population.to_parameters()?;
    let raw = args.source.read()?;
    let submission = process_submission(&params, &args.id, &raw, args.level)?;
    println!(
        "{}",
        formatter.format_interval(submission.sample.student_id(), &submission.result)?
    );
    Ok(())
}
