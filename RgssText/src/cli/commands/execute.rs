//! Command execution implementations

use super::Commands;
use super::{inspect, project};
use crate::project::ProcessingMode;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, logging: bool) -> anyhow::Result<()> {
        match self {
            Commands::Extract { args, force, append } => {
                let mode = if *force {
                    ProcessingMode::Force
                } else if *append {
                    ProcessingMode::Append
                } else {
                    ProcessingMode::Default
                };
                project::extract(&args.project, &args.options(mode, logging))
            }
            Commands::Inject { args } => {
                project::inject(&args.project, &args.options(ProcessingMode::Default, logging))
            }
            Commands::Inspect { file, output, scripts } => {
                inspect::execute(file, output.as_deref(), *scripts)
            }
        }
    }
}
