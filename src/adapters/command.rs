use crate::utils::logger;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// A single invocation of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    /// Installs and library migrations can take many minutes
    pub long_running: bool,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            long_running: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    /// Shell-like rendering used in log lines
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = self
            .envs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a finished tool invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// One-line description of a failed invocation, with the tail of stderr
    pub fn failure_summary(&self, command: &ToolCommand) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        let detail = self
            .stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| format!(": {}", line.trim()))
            .unwrap_or_default();
        format!("`{}` failed with {status}{detail}", command.display())
    }
}

/// Executes external commands on behalf of the version manager adapters
pub trait CommandRunner {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput>;
}

/// Runs commands as child processes of this one
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput> {
        logger::verbose(&format!("Executing: {}", command.display()));

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not piped"))?;
        let stderr_handle = thread::spawn(move || {
            let mut buf = Vec::new();
            BufReader::new(stderr)
                .read_to_end(&mut buf)
                .map(|_| String::from_utf8_lossy(&buf).into_owned())
        });

        let spinner = command.long_running.then(|| spinner_for(command));

        // Tool output is not always UTF-8 (build logs under a Latin-1 locale)
        let mut stdout = String::new();
        let mut read_error = None;
        if let Some(out) = child.stdout.take() {
            let mut reader = BufReader::new(out);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&raw);
                        let line = text.trim_end_matches(['\r', '\n']);
                        logger::verbose(line);
                        if let Some(pb) = &spinner {
                            pb.set_message(line.trim().to_string());
                        }
                        stdout.push_str(line);
                        stdout.push('\n');
                    }
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                }
            }
        }

        let status = child.wait();
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let stderr = stderr_handle.join();

        let status = status?;
        if let Some(e) = read_error {
            return Err(e);
        }
        let stderr = match stderr {
            Ok(result) => result?,
            Err(_) => return Err(io::Error::other("stderr reader thread panicked")),
        };
        for line in stderr.lines() {
            logger::verbose(line);
        }

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

fn spinner_for(command: &ToolCommand) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("  {spinner} {prefix} {wide_msg}")
    {
        pb.set_style(style);
    }
    pb.set_prefix(command.display());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
