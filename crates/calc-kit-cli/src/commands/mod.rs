pub mod documents;
pub mod health;
pub mod lease;
pub mod loan;
pub mod text;

use calc_kit_core::Currency;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Add a `formatted` map of currency strings for the named result fields.
pub fn attach_formatted(value: &mut Value, currency: &Currency, fields: &[&str]) {
    let Some(result) = value.get("result") else {
        return;
    };

    let formatted: serde_json::Map<String, Value> = fields
        .iter()
        .filter_map(|field| {
            let raw = result.get(*field)?;
            let amount = match raw {
                Value::String(s) => Decimal::from_str(s).ok()?,
                Value::Number(n) => Decimal::from_str(&n.to_string()).ok()?,
                _ => return None,
            };
            Some((
                field.to_string(),
                Value::String(currency.format_amount(amount)),
            ))
        })
        .collect();

    if let Value::Object(map) = value {
        map.insert("formatted".into(), Value::Object(formatted));
    }
}
