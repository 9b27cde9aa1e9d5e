// External process execution for a finished argument list

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
    /// Signal that killed the process, if any. Always `None` off unix.
    pub signal: Option<i32>,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn from_status(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

enum Forwarding<W> {
    Active(JoinHandle<std::io::Result<W>>),
    Idle(W),
}

#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the program to completion.
    ///
    /// With `stream_output` the child's stderr is copied live to our stdout,
    /// otherwise it is discarded. A non-zero exit is reported, not returned
    /// as an error.
    pub async fn run(&self, args: &[String], stream_output: bool) -> Result<ExitReport> {
        let (report, _) = self
            .run_with_sink(args, stream_output, tokio::io::stdout())
            .await?;
        Ok(report)
    }

    /// Like [`run`](Self::run), but forwards stderr into `sink` one line at
    /// a time. The sink is handed back untouched when `stream_output` is off.
    pub async fn run_with_sink<W>(
        &self,
        args: &[String],
        stream_output: bool,
        mut sink: W,
    ) -> Result<(ExitReport, W)>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(if stream_output {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        tracing::info!("Running {} with {} arguments", self.program.display(), args.len());
        let mut child = cmd
            .spawn()
            .map_err(|e| anyhow!("Failed to spawn {}: {}", self.program.display(), e))?;

        let forwarding = match child.stderr.take() {
            Some(stderr) => Forwarding::Active(tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Some(line) = lines.next_line().await? {
                    sink.write_all(line.as_bytes()).await?;
                    sink.write_all(b"\n").await?;
                    sink.flush().await?;
                }
                Ok::<W, std::io::Error>(sink)
            })),
            None => Forwarding::Idle(sink),
        };

        let status = child
            .wait()
            .await
            .map_err(|e| anyhow!("Failed to wait for {}: {}", self.program.display(), e))?;

        let sink = match forwarding {
            Forwarding::Active(task) => task
                .await
                .context("stderr forwarding task panicked")?
                .context("Failed to forward stderr")?,
            Forwarding::Idle(sink) => sink,
        };

        let report = ExitReport::from_status(status);
        tracing::info!(
            "ffmpeg child process exited with code {:?} and signal {:?}",
            report.code,
            report.signal
        );
        if !report.success() {
            tracing::warn!("{} did not exit cleanly", self.program.display());
        }
        Ok((report, sink))
    }

    /// Start the program in the background and call `on_exit` once it ends.
    ///
    /// Returns immediately. There is no way to cancel the child once started.
    /// Without a callback, await the handle or use [`run`](Self::run).
    pub fn run_with_callback<F>(
        &self,
        args: Vec<String>,
        stream_output: bool,
        on_exit: F,
    ) -> JoinHandle<Result<ExitReport>>
    where
        F: FnOnce(ExitReport) + Send + 'static,
    {
        let runner = self.clone();
        tokio::spawn(async move {
            let report = runner.run(&args, stream_output).await?;
            on_exit(report);
            Ok(report)
        })
    }
}

/// Query `<program> -version` and parse the release number.
pub fn ffmpeg_version(program: &Path) -> Result<(u32, u32, u32)> {
    let output = std::process::Command::new(program)
        .arg("-version")
        .output()
        .with_context(|| {
            format!(
                "Failed to execute {} -version. Is ffmpeg installed and in PATH?",
                program.display()
            )
        })?;

    if !output.status.success() {
        return Err(anyhow!("{} -version command failed", program.display()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version(&stdout)
        .ok_or_else(|| anyhow!("Failed to parse ffmpeg version from output: {}", stdout))
}

/// Parse output like "ffmpeg version 8.0.1" or "ffmpeg version n7.1.0".
pub fn parse_version(output: &str) -> Option<(u32, u32, u32)> {
    let re = Regex::new(r"ffmpeg version[^\d]*(\d+)\.(\d+)(?:\.(\d+))?").ok()?;
    let caps = re.captures(output)?;

    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some((major, minor, patch))
}
