//! `cf-print-inv`: draws the player's inventory in the game window.
//!
//! Run it from the client with `/script cf-print-inv`.

use std::process::ExitCode;

fn main() -> ExitCode {
    cfscript_inventory::run(std::env::args_os())
}
