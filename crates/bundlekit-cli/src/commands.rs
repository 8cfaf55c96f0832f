//! Subcommand implementations.

use bundlekit::{BundlerKind, Context, FixedPipeline, ProcessOutput};

use crate::cli::{Cli, Command};
use crate::error::{CliError, Result};
use crate::ui;

/// Run the parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    if let Command::Bundlers = cli.command {
        list_bundlers();
        return Ok(());
    }

    let ctx = context(&cli)?;
    let coordinator = ctx.coordinator();

    match cli.command {
        Command::Build(build) => {
            let bundler = ctx.store().bundler_name(ctx.env());
            let result = coordinator.build(&build.args)?;
            log_bundler_output(&bundler, &result.output);
            ui::print_build_summary(&bundler, &result);
        }
        Command::Watch(watch) => {
            ui::info(&format!("Watching ({}); press Ctrl-C to stop", ctx.env()));
            let status = coordinator.watch(&watch.args)?;
            if !status.success() {
                tracing::debug!(?status, "watcher stopped");
                ui::warning(&format!("Watcher exited with {status}"));
            }
        }
        Command::Install(install) => {
            coordinator.install(&install.args)?;
            ui::success("Dependencies installed");
        }
        Command::Add(add) => {
            require(coordinator.add(&add.packages)?, "add")?;
            ui::success(&format!("Added {}", add.packages.join(", ")));
        }
        Command::Remove(remove) => {
            require(coordinator.remove(&remove.packages)?, "remove")?;
            ui::success(&format!("Removed {}", remove.packages.join(", ")));
        }
        Command::Exec(exec) => require(coordinator.exec(&exec.args)?, "exec")?,
        Command::Version => println!("{}", coordinator.version()?),
        Command::Config => {
            let config = ctx.config()?;
            println!("{}", serde_json::to_string_pretty(&config.to_value())?);
        }
        Command::Bundlers => list_bundlers(),
    }
    Ok(())
}

fn context(cli: &Cli) -> Result<Context> {
    let mut builder = Context::builder(&cli.root);
    if let Some(env) = &cli.env {
        builder = builder.env(env);
    }
    if let Some(layout) = cli.manifest_layout {
        builder = builder.pipeline(FixedPipeline(layout));
    }
    Ok(builder.build()?)
}

/// Replay what the bundler printed during a successful build.
///
/// Its stderr usually carries warnings and is logged at info; stdout is
/// only shown with `--verbose`.
fn log_bundler_output(bundler: &str, output: &ProcessOutput) {
    for line in non_blank_lines(&output.stderr) {
        tracing::info!(bundler, "{line}");
    }
    for line in non_blank_lines(&output.stdout) {
        tracing::debug!(bundler, "{line}");
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim_end).filter(|line| !line.is_empty())
}

fn list_bundlers() {
    for name in BundlerKind::names() {
        println!("{name}");
    }
}

fn require(succeeded: bool, operation: &'static str) -> Result<()> {
    if succeeded {
        Ok(())
    } else {
        Err(CliError::OperationFailed { operation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_bundler_lines_are_dropped() {
        let lines: Vec<_> = non_blank_lines("\n  warning: large chunk  \n\n done\n").collect();
        assert_eq!(lines, ["  warning: large chunk", " done"]);
    }

    #[test]
    fn require_maps_false_to_operation_failed() {
        assert!(require(true, "add").is_ok());
        assert!(matches!(
            require(false, "remove"),
            Err(CliError::OperationFailed { operation: "remove" })
        ));
    }
}
