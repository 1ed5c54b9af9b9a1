use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
}

pub fn print_output(format: OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Pretty => print_pretty(value)?,
        OutputFormat::Table => println!("{}", render_table(value)),
    }
    Ok(())
}

fn print_pretty(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    Value::String(s) => println!("{}: {}", key_colored, s.green()),
                    Value::Number(n) => println!("{}: {}", key_colored, n.to_string().yellow()),
                    Value::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    Value::Null => println!("{}: {}", key_colored, "-".dimmed()),
                    _ => println!("{}: {}", key_colored, val),
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Arrays of objects become one row per element; a single object becomes
/// a two-column field/value table.
pub fn render_table(value: &Value) -> String {
    let mut builder = Builder::default();
    match value {
        Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            let mut headers: Vec<String> = Vec::new();
            for row in rows.iter().filter_map(Value::as_object) {
                for key in row.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }
            builder.push_record(headers.clone());
            for row in rows {
                builder.push_record(headers.iter().map(|h| cell(row.get(h))));
            }
        }
        Value::Object(map) => {
            builder.push_record(["field".to_string(), "value".to_string()]);
            for (key, val) in map {
                builder.push_record([key.clone(), cell(Some(val))]);
            }
        }
        other => builder.push_record([cell(Some(other))]),
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_unions_row_keys() {
        let rendered = render_table(&json!([
            { "id": "fury", "name": "Fury" },
            { "id": "gambit", "country": "United States" }
        ]));
        assert!(rendered.contains("country"));
        assert!(rendered.contains("United States"));
        assert!(rendered.contains("Fury"));
    }

    #[test]
    fn cells_flatten_strings_and_nulls() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(&Value::Null)), "");
        assert_eq!(cell(Some(&json!(["ISR", "Strike"]))), "ISR, Strike");
        assert_eq!(cell(Some(&json!(42))), "42");
    }
}
