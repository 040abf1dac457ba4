//! Train a model from TSV observations

use anyhow::Result;
use std::path::Path;

use super::open_input;
use crate::client::RegressionClient;
use crate::output::{print_training_results, OutputFormat};

/// Read `x y [weight]` lines and fit a model on the server
pub async fn train(
    client: &dyn RegressionClient,
    input: Option<&Path>,
    store: bool,
    format: OutputFormat,
) -> Result<()> {
    let instances = slr_lib::load_instances_from_tsv(open_input(input)?)?;

    let results = client.train(&instances, store).await?;
    print_training_results(&results, format)
}
