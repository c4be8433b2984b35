//! Results command implementation.

use crate::error::Result;
use crate::output::Formatter;
use coverlab_domain::LedgerRecord;
use coverlab_sdk::ClassroomClient;

/// Execute the results command.
pub async fn execute_results(client: &ClassroomClient, formatter: &Formatter) -> Result<()> {
    let records = client
        .records()
        .await?
        .into_iter()
        .map(LedgerRecord::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    println!("{}", formatter.format_records(&records)?);
    Ok(())
}
