//! Executable launched by the Stream Dock host.
//!
//! The binary delegates to [`streamdock_runtime::run`], which parses the
//! host's launch arguments, loads configuration, installs logging and serves
//! the host connection until the host closes it.

use std::io::{self, StderrLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    streamdock_runtime::run(std::env::args_os(), &mut stderr)
}
