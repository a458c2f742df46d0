//! `watch`: keep the poller running and print a line per completed cycle.

use mikrosync_core::Controller;

use crate::cli::{GlobalOpts, Section, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Subscribe before connecting so the first scheduled cycle is not missed.
    let mut listener = controller.subscribe();
    controller.connect().await?;

    let initial = output::render_snapshot(global.output, &controller.snapshot(), Section::All)?;
    output::print_output(&initial, global.quiet);

    let result = watch_loop(controller, &mut listener, args.count, global).await;
    controller.disconnect().await;
    result
}

async fn watch_loop(
    controller: &Controller,
    listener: &mut mikrosync_core::UpdateListener,
    count: Option<u64>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut cycles = 0_u64;
    // The inline connect cycle already signalled; start from a clean slate.
    if listener.has_changed() {
        listener.changed().await;
    }

    loop {
        if count.is_some_and(|limit| cycles >= limit) {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                return Ok(());
            }
            alive = listener.changed() => {
                if !alive {
                    tracing::warn!(router = %controller.config().name, "update signal closed");
                    return Ok(());
                }
            }
        }

        cycles += 1;
        let line =
            output::render_cycle_line(global.output, &controller.snapshot(), chrono::Local::now())?;
        output::print_output(&line, global.quiet);
    }
}
