use log::warn;
use std::io;
use std::io::Write;
use std::process::{Command, Stdio};

/// Lets the user pick one line of `options`. `None` if dmenu was cancelled.
pub fn select(prompt: &str, options: &str) -> io::Result<Option<String>> {
    dmenu(options, vec!["-b", "-i", "-l", "20", "-p", prompt])
}

/// Free text entry.
pub fn prompt(prompt: &str) -> io::Result<Option<String>> {
    dmenu("", vec!["-b", "-p", prompt])
}

/// Text entry with the typed characters drawn black on black.
pub fn prompt_hidden(prompt: &str) -> io::Result<Option<String>> {
    dmenu("", vec!["-b", "-p", prompt, "-nb", "black", "-nf", "black"])
}

fn dmenu(input: &str, args: Vec<&str>) -> io::Result<Option<String>> {
    choose(Command::new("dmenu").args(args), input)
}

fn choose(command: &mut Command, input: &str) -> io::Result<Option<String>> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    // stdin is closed before waiting so the menu sees the end of its options.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "dmenu stdin unavailable")),
    };
    let output = child.wait_with_output()?;
    written?;

    if !output.status.success() {
        warn!("Dmenu process cancelled with exit code {:?}", output.status.code());
        return Ok(None);
    }
    let choice = String::from_utf8_lossy(&output.stdout);
    let choice = choice.trim().to_owned();
    Ok(Some(choice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_output_line() {
        let choice = choose(Command::new("head").arg("-n1"), "DE Germany\nFR France\n").unwrap();
        assert_eq!(choice.as_deref(), Some("DE Germany"));
    }

    #[test]
    fn cancelled_is_none() {
        assert_eq!(choose(&mut Command::new("false"), "").unwrap(), None);
    }

    #[test]
    fn write_error_is_reported_after_wait() {
        let err = choose(&mut Command::new("true"), &"x".repeat(1 << 20)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
