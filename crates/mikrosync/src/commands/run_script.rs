//! `run-script`: execute a script from /system/script.

use mikrosync_core::Controller;

use crate::cli::{GlobalOpts, RunScriptArgs};
use crate::error::CliError;

pub async fn handle(
    controller: &Controller,
    args: &RunScriptArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !controller.run_script(&args.name).await? {
        return Err(CliError::NotFound {
            path: "/system/script".into(),
            selector: format!("name={}", args.name),
        });
    }
    if !global.quiet {
        eprintln!("script '{}' started", args.name);
    }
    Ok(())
}
