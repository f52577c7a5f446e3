//! Check command implementation

use anyhow::Result;
use clap::Args;

use super::flags::LaunchFlags;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub flags: LaunchFlags,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let resolved = args.flags.resolve()?;
    print!("{}", serde_yaml::to_string(&resolved)?);
    Ok(())
}
