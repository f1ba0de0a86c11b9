use log::info;
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process;

const MASK: &str = "********";

// A single external program call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<String>,
    pub secrets: Vec<String>,
}

impl Invocation {
    pub fn new(program: &str) -> Invocation {
        Invocation {
            program: program.to_string(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Invocation {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Invocation {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Invocation {
        self.stdin = Some(input.into());
        self
    }

    /// Marks a value that must never show up in logs or error messages.
    pub fn secret(mut self, value: &str) -> Invocation {
        if !value.is_empty() {
            self.secrets.push(value.to_string());
        }
        self
    }

    pub fn mask(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, s| acc.replace(s.as_str(), MASK))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::new();
        for (k, v) in &self.env {
            line.push_str(&format!("{}={} ", k, v));
        }
        line.push_str(&self.program);
        for a in &self.args {
            if a.is_empty() || a.contains(char::is_whitespace) {
                line.push_str(&format!(" '{}'", a));
            } else {
                line.push(' ');
                line.push_str(a);
            }
        }
        write!(f, "{}", self.mask(&line))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[cfg(test)]
    pub fn failed(code: i32, stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct CommandFailed {
    pub command: String,
    pub code: Option<i32>,
    pub stderr: String,
    pub stdout: String,
}

impl CommandFailed {
    /// Exit status for the whole run; signals and unknown codes collapse to 1.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            Some(c) if c != 0 => c,
            _ => 1,
        }
    }
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command failed (exit code {})\ncommand: {}\nstderr: {}\nstdout: {}",
            self.code.map(|c| c.to_string()).unwrap_or("none".to_string()),
            self.command,
            self.stderr.trim_end(),
            self.stdout.trim_end()
        )
    }
}

impl std::error::Error for CommandFailed {}

// Seam between the provisioning steps and the host; swapped for a recorder in tests
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, anyhow::Error>;

    async fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput, anyhow::Error> {
        let output = self.run(invocation).await?;
        if !output.success() {
            return Err(CommandFailed {
                command: invocation.to_string(),
                code: output.code,
                stderr: invocation.mask(&output.stderr),
                stdout: invocation.mask(&output.stdout),
            }
            .into());
        }
        Ok(output)
    }
}

pub struct SystemRunner {}

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, anyhow::Error> {
        info!("[RUN     ] {}", invocation);
        let mut command = process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|e| {
            anyhow::anyhow!("failed to execute {}: {}", invocation.program, e)
        })?;

        if let Some(input) = &invocation.stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes()).await?;
                pipe.shutdown().await?;
            }
        }

        let output = child.wait_with_output().await?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

pub struct DryRunner {}

impl CommandRunner for DryRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, anyhow::Error> {
        info!("[DRY RUN ] {}", invocation);
        Ok(CommandOutput::ok(""))
    }
}
