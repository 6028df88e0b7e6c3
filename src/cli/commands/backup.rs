use clap::{Args, Subcommand};
use serde_json::{Map, Value};

use crate::cli::utils::{output_envelope, output_records};
use crate::cli::OutputFormat;
use crate::config;
use crate::gateway::{CONFIRM_FIELD, SECRET_FIELD};
use crate::handlers::actions::backups;
use crate::state::AppState;

/// Master password and confirmation, required by every mutating command
#[derive(Args, Debug, Clone)]
pub struct Authorization {
    #[arg(long, env = "COMMANDER_PASSWORD", hide_env_values = true, help = "Master password")]
    pub password: Option<String>,

    #[arg(long, help = "Confirm that you understand this action")]
    pub yes: bool,
}

impl Authorization {
    fn input(&self, fields: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
        let mut input: Map<String, Value> = fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        if let Some(password) = &self.password {
            input.insert(SECRET_FIELD.to_string(), Value::String(password.clone()));
        }
        input.insert(CONFIRM_FIELD.to_string(), Value::Bool(self.yes));
        input
    }
}

#[derive(Subcommand)]
pub enum BackupCommands {
    #[command(about = "Snapshot the database into the backup directory")]
    Create {
        #[arg(long, help = "Label prefixed to the backup file name")]
        label: Option<String>,
        #[command(flatten)]
        auth: Authorization,
    },

    #[command(about = "List backups, newest first")]
    List,

    #[command(about = "Replay a backup against the database")]
    Restore {
        #[arg(help = "Backup file name")]
        file: String,
        #[command(flatten)]
        auth: Authorization,
    },

    #[command(about = "Delete a backup file")]
    Delete {
        #[arg(help = "Backup file name")]
        file: String,
        #[command(flatten)]
        auth: Authorization,
    },
}

pub async fn handle(cmd: BackupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = AppState::from_config(config::config().clone());

    let envelope = match cmd {
        BackupCommands::List => {
            let records = state.backups.list()?;
            return output_records(&output_format, &records);
        }
        BackupCommands::Create { label, auth } => {
            let input = auth.input([("label", label.map_or(Value::Null, Value::String))]);
            backups::create_backup(&state, &input).await
        }
        BackupCommands::Restore { file, auth } => {
            backups::restore_backup(&state, &auth.input([("file", Value::String(file))])).await
        }
        BackupCommands::Delete { file, auth } => {
            backups::delete_backup(&state, &auth.input([("file", Value::String(file))])).await
        }
    };

    state.database.close().await;
    output_envelope(&output_format, &envelope)
}
