use std::process::Command;

/// Run a tool to completion and return its stdout.
/// Blocks the calling thread; spawn failure and non-zero exit both come back
/// as a message string for the caller to wrap in its own error kind.
pub fn run_tool(prog: &str, args: &[&str]) -> Result<String, String> {
    let output = match Command::new(prog).args(args).output() {
        Ok(output) => output,
        Err(err) => return Err(format!("command {} failed: {}", prog, err)),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    log_call_output(&stdout);

    if !output.status.success() {
        return Err(format!(
            "command {} exited with {}: {}",
            prog,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(stdout)
}

fn log_call_output(output: &str) {
    log::trace!("\"\"\"{}\"\"\"", output);
}
