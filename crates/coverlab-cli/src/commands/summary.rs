//! Summary command implementation.

use crate::error::Result;
use crate::output::Formatter;
use coverlab_sdk::ClassroomClient;

/// Execute the summary command.
pub async fn execute_summary(client: &ClassroomClient, formatter: &Formatter) -> Result<()> {
    let summary = client.summary().await?;
    println!("{}", formatter.format_summary(&summary)?);
    Ok(())
}
