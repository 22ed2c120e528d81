use anyhow::Result;

use medx_cli::run::{CheckReport, RunOptions, RunReport, check_config, run_extract};

use crate::cli::{CheckArgs, RunArgs};

pub fn run(args: &RunArgs) -> Result<RunReport> {
    run_extract(&RunOptions {
        config: args.config.clone(),
        input: args.input.clone(),
        output: args.output.clone(),
        dry_run: args.dry_run,
    })
}

pub fn check(args: &CheckArgs) -> Result<CheckReport> {
    check_config(&args.config)
}
