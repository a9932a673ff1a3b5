//! Runs external tools on behalf of command-backed targets

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::version::error::TargetError;
use crate::version::target::TargetId;

/// Run `program` with `args` and return its stdout
///
/// A program that cannot be spawned makes the target unavailable; a non-zero
/// exit is a command failure.
pub async fn run(target: TargetId, program: &str, args: &[&str]) -> Result<String, TargetError> {
    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                TargetError::unavailable(target, format!("cannot run {}: {}", program, e))
            }
            _ => TargetError::Command(format!("{}: {}", program, e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TargetError::Command(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Non-empty trimmed lines of command output
pub fn output_lines(stdout: &str) -> impl Iterator<Item = &str> {
    stdout.lines().map(str::trim).filter(|line| !line.is_empty())
}
