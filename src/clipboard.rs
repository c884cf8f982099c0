use std::io;
use std::io::Write;
use std::process::{Command, Stdio};

pub fn copy_to_clipboard(value: &str) -> io::Result<()> {
    pipe_to(Command::new("xsel").arg("-b"), value)
}

/// Feeds `input` to `command` and waits for it, even when the write fails.
fn pipe_to(command: &mut Command, input: &str) -> io::Result<()> {
    let mut child = command.stdin(Stdio::piped()).spawn()?;
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };
    child.wait()?;
    written
}
