use super::ConfigArgs;
use crate::errors::AppResult;
use clap::Args;

/// Print the effective configuration as config.toml
#[derive(Args)]
pub struct ShowConfigCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ShowConfigCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = self.config.load()?;
        // Fail on an unusable network before printing it
        config.protocol_params()?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }
}
