//! Shell Build Runner
//!
//! Runs the user's build command through the platform shell and forwards its
//! output line by line while it runs.

use crate::domain::ports::{BuildOutput, BuildRunner, DeployEvent, DeployEventSink, OutputStream};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBuildRunner;

impl ShellBuildRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

/// Forward every line of `reader` as a build output event, returning what was read
fn forward_lines<R: Read>(
    reader: R,
    stream: OutputStream,
    events: &dyn DeployEventSink,
) -> io::Result<String> {
    let mut collected = String::new();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        collected.push_str(&line);
        events.on_event(DeployEvent::BuildOutput {
            stream,
            line: line.trim_end_matches(['\r', '\n']).to_string(),
        });
    }
    Ok(collected)
}

impl BuildRunner for ShellBuildRunner {
    fn run(
        &self,
        command: &str,
        cwd: &Path,
        events: &dyn DeployEventSink,
    ) -> io::Result<BuildOutput> {
        let mut child = Self::shell(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes concurrently so neither fills up and blocks the build
        let stderr_text = std::thread::scope(|scope| -> io::Result<String> {
            let out = scope.spawn(move || match stdout {
                Some(pipe) => forward_lines(pipe, OutputStream::Stdout, events).map(drop),
                None => Ok(()),
            });
            let err_text = match stderr {
                Some(pipe) => forward_lines(pipe, OutputStream::Stderr, events)?,
                None => String::new(),
            };
            out.join()
                .map_err(|_| io::Error::other("build output reader panicked"))??;
            Ok(err_text)
        })?;

        let status = child.wait()?;
        Ok(BuildOutput {
            exit_code: status.code(),
            stderr: stderr_text,
        })
    }
}
