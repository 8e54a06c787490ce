use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::account::{AccountEditor, AccountForm, Registrar};
use crate::api::{DuplicateField, Role};
use crate::cli::config::{api_client, load_session};
use crate::cli::utils::{output_success, ConsoleNotifier};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Check whether an ID, TID or payment key is still free")]
    Check {
        #[arg(value_enum)]
        field: FieldArg,
        value: String,
    },

    #[command(about = "Register a partner or store from a JSON form")]
    Register {
        #[arg(value_enum)]
        role: RoleArg,
        #[arg(long, help = "Path to the JSON form")]
        data: PathBuf,
    },

    #[command(about = "Edit a partner or store account from a JSON form")]
    Edit {
        #[arg(value_enum)]
        role: RoleArg,
        #[arg(long, help = "Path to the JSON form")]
        data: PathBuf,
        #[arg(long, help = "Account password; required when the form changes bank details")]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Partner,
    Store,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Partner => Role::Partner,
            RoleArg::Store => Role::Store,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldArg {
    PartnerId,
    UserId,
    TerminalTid,
    KeyinTid,
    KeyinPaykey,
}

fn read_form(path: &PathBuf) -> anyhow::Result<AccountForm> {
    let content = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(AccountForm::from_value(value)?)
}

pub async fn handle(cmd: AccountCommands, output_format: OutputFormat, backend: Option<String>) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = api_client(backend.as_deref())?;

    match cmd {
        AccountCommands::Check { field, value } => {
            let mut registrar = Registrar::new(client, session, Arc::new(ConsoleNotifier));
            let field = match field {
                FieldArg::PartnerId => {
                    registrar.check_partner_id(&value).await?;
                    "partner ID"
                }
                FieldArg::UserId => check(&mut registrar, DuplicateField::UserId, &value).await?,
                FieldArg::TerminalTid => check(&mut registrar, DuplicateField::TerminalTid, &value).await?,
                FieldArg::KeyinTid => check(&mut registrar, DuplicateField::KeyinTid, &value).await?,
                FieldArg::KeyinPaykey => check(&mut registrar, DuplicateField::KeyinPayKey, &value).await?,
            };
            output_success(
                &output_format,
                &format!("The {} '{}' is available", field, value),
                Some(json!({ "available": true })),
            )
        }
        AccountCommands::Register { role, data } => {
            let form = read_form(&data)?;
            let mut registrar = Registrar::new(client, session, Arc::new(ConsoleNotifier));
            let message = registrar.register(role.into(), &form).await?;
            output_success(&output_format, "Registration complete", Some(json!({ "server_message": message })))
        }
        AccountCommands::Edit { role, data, password } => {
            let form = read_form(&data)?;
            let mut editor = AccountEditor::new(client, session, Arc::new(ConsoleNotifier));
            if let Some(password) = password {
                editor.verify_password(&password).await?;
            }
            let message = editor.edit(role.into(), &form).await?;
            output_success(&output_format, "Changes saved", Some(json!({ "server_message": message })))
        }
    }
}

async fn check(
    registrar: &mut Registrar<crate::api::ApiClient>,
    field: DuplicateField,
    value: &str,
) -> anyhow::Result<&'static str> {
    registrar.check_duplicate(field, value).await?;
    Ok(field.label())
}
