pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use colored::Colorize;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    if let Some(message) = placeholder_message(value) {
        match format {
            OutputFormat::Json => json::print_json(value),
            _ => println!("{}", message.dimmed()),
        }
        return;
    }

    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Neutral "no result yet" envelope shown instead of an error when inputs
/// are missing or not yet valid.
pub fn placeholder(message: impl Into<String>) -> Value {
    serde_json::json!({
        "result": Value::Null,
        "message": message.into(),
    })
}

fn placeholder_message(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.get("result").is_some_and(Value::is_null) {
        return map.get("message").and_then(Value::as_str);
    }
    None
}
