//! Art Keeper CLI entrypoint.
//!
//! Mirrors the releases of every configured repository into the destination
//! bucket, then exits with status 0, or 1 if the run was aborted. With
//! `--strict`, a run that recorded failed releases or assets exits with 2.

use art_keeper::sync::SyncReport;
use art_keeper_mirror::app::{exit_code_for_report, run};
use art_keeper_mirror::cli::Cli;
use art_keeper_mirror::dirs::SystemBaseDirs;
use art_keeper_mirror::error::Result;
use art_keeper_mirror::logging;
use clap::Parser;
use std::io::Write;

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbosity, cli.quiet);

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBaseDirs);
    let exit_code = exit_code_for_run_result(run_result, cli.strict, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn exit_code_for_run_result(result: Result<SyncReport>, strict: bool, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(report) => exit_code_for_report(&report, strict),
        Err(err) => {
            write_stderr_line(stderr, format_args!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort; nothing else can report the failure.
    }
}
