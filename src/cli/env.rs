//! Env command implementation

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::flags::LaunchFlags;
use crate::env::serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// KEY=VALUE lines
    #[default]
    Shell,
    /// A single JSON object
    Json,
}

#[derive(Args)]
pub struct EnvArgs {
    #[command(flatten)]
    pub flags: LaunchFlags,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Shell)]
    pub format: OutputFormat,
}

pub fn run(args: EnvArgs) -> Result<()> {
    let resolved = args.flags.resolve()?;
    let env = serialize(&resolved);
    tracing::debug!("Serialized {} environment variable(s)", env.len());

    match args.format {
        OutputFormat::Shell => {
            for (key, value) in &env {
                println!("{key}={value}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&env)?),
    }
    Ok(())
}
