mod command;

use anyhow::Context;
use lectern_backend::{ControllerError, config::StoragePaths, runtime};

use crate::command::Command;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .with_colors(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    let commands = std::env::args()
        .skip(1)
        .map(|argument| argument.parse::<Command>())
        .collect::<Result<Vec<_>, _>>()?;

    let runtime = runtime::build_runtime().context("failed to build tokio runtime")?;
    runtime.block_on(run(commands))
}

/// Loads the reading state, applies the requested changes and prints the
/// resulting settings.
async fn run(commands: Vec<Command>) -> anyhow::Result<()> {
    let paths = StoragePaths::resolve()?;
    let controller = runtime::open_controller(&paths).await;
    let mut errors = controller
        .subscribe_errors()
        .context("error channel already taken")?;
    controller.subscribe(|| log::debug!("Reading state changed"));

    let content = controller.load().await;
    let writes: Vec<_> = commands
        .iter()
        .map(|command| command.apply(&*controller))
        .collect();

    for pending in writes {
        // failures are counted from the error channel below
        let _ = pending.wait().await;
    }
    let _ = content.wait().await;

    let mut unsaved = 0;
    while let Ok(error) = errors.try_recv() {
        match &*error {
            ControllerError::Persistence(error) => {
                log::error!("{error}");
                unsaved += 1;
            }
            other => log::warn!("{other}"),
        }
    }

    log::info!("Controller phase: {:?}", controller.phase());
    print!("{}", toml::to_string_pretty(&controller.settings())?);

    if unsaved > 0 {
        anyhow::bail!("{unsaved} change(s) could not be saved to {:?}", paths.settings_file);
    }
    Ok(())
}
