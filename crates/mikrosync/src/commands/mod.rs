//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod config_cmd;
pub mod run_script;
pub mod set;
pub mod snapshot;
pub mod watch;

use mikrosync_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::config::build_controller_config;
use crate::error::CliError;

/// Dispatch a router-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Snapshot(args) => {
            let config = build_controller_config(global, None)?;
            snapshot::handle(config, &args, global).await
        }
        Command::Watch(args) => {
            let config = build_controller_config(global, args.interval)?;
            let controller = Controller::new(config)?;
            watch::handle(&controller, &args, global).await
        }
        Command::Set(args) => {
            let controller = Controller::new(build_controller_config(global, None)?)?;
            set::handle(&controller, &args, global).await
        }
        Command::RunScript(args) => {
            let controller = Controller::new(build_controller_config(global, None)?)?;
            run_script::handle(&controller, &args, global).await
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
