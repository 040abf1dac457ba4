//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use slr_lib::{ModelValue, TrainingResults, UsageStats};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Argument")]
    argument: f64,
    #[tabled(rename = "Value")]
    value: f64,
    #[tabled(rename = "Cached")]
    from_cache: bool,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rows<T: Tabled>(rows: Vec<T>) {
    println!("{}", Table::new(rows).with(Style::rounded()));
}

pub fn print_training_results(results: &TrainingResults, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(results);
    }

    let mut rows = vec![
        FieldRow::new("coefficient", results.model.coefficient),
        FieldRow::new("intercept", results.model.intercept),
        FieldRow::new("sum_squared_errors", results.sum_squared_errors),
    ];
    if let Some(name) = &results.name {
        rows.push(FieldRow::new("name", name));
    }
    if let Some(creation_time) = &results.creation_time {
        rows.push(FieldRow::new("creation_time", creation_time.to_rfc3339()));
    }
    print_rows(rows);

    match (&results.name, &results.error) {
        (_, Some(error)) => print_warning(&format!("Model not stored: {}", error)),
        (Some(name), None) => print_success(&format!("Stored model {}", name.cyan())),
        (None, None) => {}
    }
    Ok(())
}

pub fn print_model_values(values: &[ModelValue], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        for value in values {
            print_json(value)?;
        }
        return Ok(());
    }

    if let Some(first) = values.first() {
        println!(
            "Model {}: f(x) = {} * x + {}",
            first.model.name.as_deref().unwrap_or("-").cyan(),
            first.model.coefficient,
            first.model.intercept
        );
    }
    print_rows(
        values
            .iter()
            .map(|v| ValueRow {
                argument: v.argument,
                value: v.value,
                from_cache: v.from_cache,
            })
            .collect(),
    );
    Ok(())
}

pub fn print_stats(stats: &UsageStats, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }

    print_rows(vec![
        FieldRow::new("total_requests", stats.total_requests),
        FieldRow::new("succeeded_requests", stats.succeeded_requests),
        FieldRow::new("total_instances", stats.total_instances),
    ]);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
