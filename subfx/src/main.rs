use crate::app::{Subfx, SubfxArgs};
use clap::Parser;
use log::error;
use std::io;
use std::process::ExitCode;

mod app;

#[tokio::main]
async fn main() -> ExitCode {
    let args = SubfxArgs::parse();
    let subfx = match Subfx::new(args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Failed to start subfx, {}", e);
            return ExitCode::FAILURE;
        }
    };

    match subfx.run(&mut io::stdout().lock()).await {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            error!("{}", summary);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to write subtitle output, {}", e);
            ExitCode::FAILURE
        }
    }
}
