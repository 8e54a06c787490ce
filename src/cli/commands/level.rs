use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::cli::config::{api_client, load_session};
use crate::cli::utils::{output_data, output_empty_collection, output_success, print_table, ConsoleNotifier};
use crate::cli::OutputFormat;
use crate::confirm::{Confirm, FixedAnswer, TerminalPrompt};
use crate::hierarchy::{DeleteOutcome, LevelEditor, LevelId, Permissions};

#[derive(Subcommand)]
pub enum LevelCommands {
    #[command(about = "List partner levels with badges and resolved paths")]
    List,

    #[command(about = "Append the next level (at most 12)")]
    Add,

    #[command(about = "Rename a level")]
    Rename {
        #[arg(help = "Level id")]
        id: u32,
        #[arg(help = "New display name")]
        name: String,
    },

    #[command(about = "Delete a level")]
    Delete {
        #[arg(help = "Level id")]
        id: u32,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Set permission flags and the special reporting path")]
    Perms {
        #[arg(help = "Level id")]
        id: u32,
        #[arg(long)]
        view: bool,
        #[arg(long)]
        edit: bool,
        #[arg(long)]
        commission: bool,
        #[arg(long, help = "Ancestor level this level reports to directly")]
        target: Option<u32>,
    },

    #[command(about = "Show levels a level may report to directly")]
    PathOptions {
        #[arg(help = "Level id")]
        id: u32,
    },
}

pub async fn handle(cmd: LevelCommands, output_format: OutputFormat, backend: Option<String>) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = api_client(backend.as_deref())?;
    let mut editor = LevelEditor::new(client, session, Arc::new(ConsoleNotifier))
        .with_max_levels(crate::config::config().console.max_levels);
    editor.refresh().await?;

    match cmd {
        LevelCommands::List => list(&editor, &output_format),
        LevelCommands::Add => {
            let id = editor.add_level().await?;
            output_success(&output_format, &format!("Added level {}", id), Some(json!({ "id": id })))
        }
        LevelCommands::Rename { id, name } => {
            editor.rename_level(LevelId(id), &name).await?;
            output_success(&output_format, &format!("Renamed level {}", id), None)
        }
        LevelCommands::Delete { id, yes } => {
            let confirm: Box<dyn Confirm> = if yes { Box::new(FixedAnswer(true)) } else { Box::new(TerminalPrompt) };
            match editor.delete_level(LevelId(id), confirm.as_ref()).await? {
                DeleteOutcome::Deleted(level) => output_success(
                    &output_format,
                    &format!("Deleted level {} ({})", id, level.name),
                    Some(json!({ "deleted": level })),
                ),
                DeleteOutcome::Cancelled => output_success(&output_format, "Cancelled", None),
            }
        }
        LevelCommands::Perms { id, view, edit, commission, target } => {
            let permissions = Permissions { view, edit, commission };
            editor.save_permissions(LevelId(id), permissions, target.map(LevelId)).await?;
            output_success(
                &output_format,
                &format!("Saved permissions for level {}", id),
                Some(json!({ "affected_children": editor.affected_children() })),
            )
        }
        LevelCommands::PathOptions { id } => {
            let options = editor.path_options(LevelId(id));
            if options.is_empty() {
                return output_empty_collection(&output_format, "levels", "No eligible levels");
            }
            output_data(&output_format, "levels", &options, |levels| {
                for level in levels {
                    println!("{:>3}  {}", level.id, level.name);
                }
            })
        }
    }
}

fn list(editor: &LevelEditor<ApiClient>, output_format: &OutputFormat) -> anyhow::Result<()> {
    let rows = editor.rows()?;
    if rows.is_empty() {
        return output_empty_collection(output_format, "levels", "No partner levels configured");
    }

    output_data(output_format, "levels", &rows, |rows| {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.order.to_string(),
                    r.id.to_string(),
                    r.name.clone(),
                    r.badges.iter().map(|b| b.label()).collect::<Vec<_>>().join(","),
                    r.path.clone(),
                ]
            })
            .collect();
        print_table(&["#", "ID", "NAME", "PERMISSIONS", "PATH"], &table);
    })
}
