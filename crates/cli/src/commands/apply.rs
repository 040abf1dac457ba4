//! Apply a stored model to arguments

use anyhow::{Context, Result};
use std::io::BufRead;

use super::open_input;
use crate::client::RegressionClient;
use crate::output::{print_model_values, OutputFormat};

/// Parse arguments given on the command line, or one per stdin line
pub fn parse_arguments(args: &[String], stdin: impl BufRead) -> Result<Vec<f64>> {
    let parse = |text: &str| -> Result<f64> {
        text.trim()
            .parse()
            .with_context(|| format!("invalid float: {}", text))
    };

    if !args.is_empty() {
        return args.iter().map(|arg| parse(arg)).collect();
    }

    let mut arguments = Vec::new();
    for line in stdin.lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        arguments.push(parse(&line)?);
    }
    Ok(arguments)
}

pub async fn apply(
    client: &dyn RegressionClient,
    model: &str,
    args: &[String],
    format: OutputFormat,
) -> Result<()> {
    let arguments = if args.is_empty() {
        parse_arguments(args, open_input(None)?)?
    } else {
        parse_arguments(args, std::io::empty())?
    };

    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        values.push(client.apply(model, argument).await?);
    }

    print_model_values(&values, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_command_line_arguments_win() {
        let args = vec!["1".to_string(), "-2.5".to_string()];
        let parsed = parse_arguments(&args, Cursor::new("99\n")).unwrap();
        assert_eq!(parsed, vec![1.0, -2.5]);
    }

    #[test]
    fn test_stdin_lines() {
        let parsed = parse_arguments(&[], Cursor::new("1\n\n 2.5 \n3e2\n")).unwrap();
        assert_eq!(parsed, vec![1.0, 2.5, 300.0]);
    }

    #[test]
    fn test_invalid_float_is_reported() {
        let err = parse_arguments(&[], Cursor::new("1\nabc\n")).unwrap_err();
        assert_eq!(err.to_string(), "invalid float: abc");
    }
}
