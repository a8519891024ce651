use clap::Subcommand;
use serde_json::{json, Value};
use std::io::{BufRead, Read, Write};

use crate::cli::{config, utils, OutputFormat};
use crate::controller::ResourceController;
use crate::resource::catalog;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records of a resource")]
    List {
        #[arg(help = "Resource name (see `curator resources`)")]
        resource: String,
    },

    #[command(about = "Create a record from a JSON draft on stdin")]
    Create {
        #[arg(help = "Resource name")]
        resource: String,
    },

    #[command(about = "Update a record from a JSON draft on stdin")]
    Update {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete a record (asks for confirmation)")]
    Delete {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to delete")]
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DataCommands::List { resource } => {
            let controller = controller_for(&resource)?;
            controller.fetch_list().await?;
            let state = controller.state();
            utils::output_records(
                &output_format,
                &resource,
                controller.descriptor().id_field,
                &state.records,
            )
        }
        DataCommands::Create { resource } => {
            let controller = controller_for(&resource)?;
            let draft = read_stdin_draft()?;

            controller.open_add()?;
            for (key, value) in draft {
                controller.update_draft_field(&key, value)?;
            }
            controller.submit().await?;
            utils::output_success(&output_format, &format!("Created {} record", resource), None)
        }
        DataCommands::Update { resource, id } => {
            let controller = controller_for(&resource)?;
            let draft = read_stdin_draft()?;

            // Edit starts from the persisted record so fields the draft
            // leaves out keep their current values
            controller.fetch_list().await?;
            let state = controller.state();
            let record = state
                .records
                .iter()
                .find(|r| controller.descriptor().record_id(r).as_deref() == Some(id.as_str()))
                .ok_or_else(|| anyhow::anyhow!("no {} record with id {}", resource, id))?;

            controller.open_edit(record)?;
            for (key, value) in draft {
                controller.update_draft_field(&key, value)?;
            }
            controller.submit().await?;
            utils::output_success(
                &output_format,
                &format!("Updated {}/{}", resource, id),
                None,
            )
        }
        DataCommands::Delete { resource, id, yes } => {
            let controller = controller_for(&resource)?;
            controller.request_delete(&id);

            if yes || confirm_prompt(&resource, &id)? {
                controller.confirm_delete().await?;
                utils::output_success(
                    &output_format,
                    &format!("Deleted {}/{}", resource, id),
                    None,
                )
            } else {
                controller.cancel_delete();
                utils::output_success(&output_format, "Delete cancelled", None)
            }
        }
    }
}

pub fn handle_resources(output_format: OutputFormat) -> anyhow::Result<()> {
    let descriptors = catalog::all();
    match output_format {
        OutputFormat::Json => {
            let listing: Vec<Value> = descriptors
                .iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "endpoint": d.endpoint,
                        "id_field": d.id_field,
                        "fields": d.fields.iter().map(|f| json!({
                            "key": f.key,
                            "required": f.required,
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "resources": listing }))?
            );
        }
        OutputFormat::Text => {
            for d in &descriptors {
                let required: Vec<&str> = d
                    .fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.key)
                    .collect();
                println!("{}  {}  (required: {})", d.name, d.endpoint, required.join(", "));
            }
        }
    }
    Ok(())
}

fn controller_for(resource: &str) -> anyhow::Result<ResourceController> {
    let descriptor = catalog::by_name(resource)
        .ok_or_else(|| anyhow::anyhow!("unknown resource: {}", resource))?;
    Ok(ResourceController::new(descriptor, config::build_dispatcher()?))
}

fn read_stdin_draft() -> anyhow::Result<serde_json::Map<String, Value>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    match serde_json::from_str(&input)? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("expected a JSON object on stdin"),
    }
}

fn confirm_prompt(resource: &str, id: &str) -> anyhow::Result<bool> {
    print!("Delete {}/{}? [y/N] ", resource, id);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
