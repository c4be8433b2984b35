//! Params command implementation.

use crate::error::Result;
use crate::output::Formatter;
use coverlab_sdk::ClassroomClient;

/// Execute the params command.
pub async fn execute_params(client: &ClassroomClient, formatter: &Formatter) -> Result<()> {
    let params = client.parameters().await?;
    println!("{}", formatter.format_parameters(&params)?);
    Ok(())
}
