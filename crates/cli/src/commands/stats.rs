//! Show server usage statistics

use anyhow::Result;

use crate::client::RegressionClient;
use crate::output::{print_stats, OutputFormat};

pub async fn stats(client: &dyn RegressionClient, format: OutputFormat) -> Result<()> {
    let stats = client.stats().await?;
    print_stats(&stats, format)
}
