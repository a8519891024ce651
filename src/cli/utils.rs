use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(extra)) = data {
                response
                    .as_object_mut()
                    .expect("response is an object")
                    .extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a record collection in the appropriate format
pub fn output_records(
    output_format: &OutputFormat,
    resource: &str,
    id_field: &str,
    records: &[Value],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ resource: records }))?
            );
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No {} found", resource);
                return Ok(());
            }
            println!("{} ({}):", resource, records.len());
            for record in records {
                let id = record
                    .get(id_field)
                    .map(display_value)
                    .unwrap_or_else(|| "-".to_string());
                let label = ["title", "name", "author", "key"]
                    .iter()
                    .find_map(|k| record.get(*k))
                    .map(display_value)
                    .unwrap_or_default();
                println!("  {}  {}", id, label);
            }
        }
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
