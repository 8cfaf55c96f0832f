//! bundlekit CLI entry point.

use bundlekit_cli::{cli, commands, logger, ui};
use clap::Parser;
use miette::{MietteHandlerOpts, Result};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let color = ui::colors_enabled();
    miette::set_hook(Box::new(move |_| {
        Box::new(MietteHandlerOpts::new().color(color).wrap_lines(false).build())
    }))?;

    commands::execute(args).map_err(miette::Report::new)
}
