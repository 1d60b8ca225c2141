use anyhow::{Context, Result, bail};
use std::io::Write;
use std::process::{Command, Stdio};

/// Pipe `text` into a clipboard command's stdin.
fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {program}"))?;

    // stdin is dropped at the end of this block so the child sees EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("Failed to write to {program}")),
        None => Err(anyhow::anyhow!("{program} has no stdin")),
    };

    // Reap the child even when the write failed
    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {program}"))?;
    written?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

/// Copy text to system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        pipe_to("pbcopy", &[], text)
    }

    #[cfg(target_os = "linux")]
    {
        // Wayland first, then the X11 tools
        pipe_to("wl-copy", &[], text)
            .or_else(|_| pipe_to("xclip", &["-selection", "clipboard"], text))
            .or_else(|_| pipe_to("xsel", &["--clipboard", "--input"], text))
    }

    #[cfg(target_os = "windows")]
    {
        pipe_to("clip", &[], text)
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = text;
        bail!("No clipboard support on this platform")
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_to_reports_exit_status() {
        assert!(pipe_to("cat", &[], "hello").is_ok());
        assert!(pipe_to("false", &[], "hello").is_err());
    }

    #[test]
    fn test_pipe_to_child_that_stops_reading() {
        // Larger than a pipe buffer, so the write fails once `true` exits
        let text = "x".repeat(1 << 20);
        assert!(pipe_to("true", &[], &text).is_err());
    }
}
