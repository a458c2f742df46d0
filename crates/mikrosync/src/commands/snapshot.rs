//! `snapshot`: one cycle, printed.

use mikrosync_core::{Controller, ControllerConfig, CoreError};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    config: ControllerConfig,
    args: &SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let check_firmware = args.check_firmware;
    let data = Controller::oneshot(config, |controller| async move {
        if check_firmware {
            controller.check_firmware().await?;
        }
        Ok::<_, CoreError>(controller.snapshot())
    })
    .await?;

    let out = output::render_snapshot(global.output, &data, args.section)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
