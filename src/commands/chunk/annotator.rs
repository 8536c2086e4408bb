use super::*;

/// Runs an external program once per window: window text on stdin, annotated
/// text on stdout.
#[derive(Debug, Clone)]
pub(super) struct CommandAnnotator {
    program: String,
    args: Vec<String>,
    max_attempts: u32,
    backoff: Duration,
}

impl CommandAnnotator {
    pub(super) fn new(
        program: impl Into<String>,
        args: Vec<String>,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub(super) fn from_args(args: &ChunkArgs) -> Option<Self> {
        let program = args.annotator_cmd.as_ref()?;
        Some(Self::new(
            program.clone(),
            args.annotator_args.clone(),
            args.annotator_attempts,
            Duration::from_secs(args.annotator_backoff_secs),
        ))
    }

    fn run_once(&self, window: &TextWindow) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn annotator {}", self.program))?;
        let mut stdin = child
            .stdin
            .take()
            .context("annotator stdin was not captured")?;

        // Feed stdin from its own thread so a large window cannot deadlock
        // against a full stdout pipe.
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(window.text.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output =
            output.with_context(|| format!("failed to wait for annotator {}", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} {} failed ({}): {}",
                self.program,
                self.args.join(" "),
                output.status,
                stderr.trim()
            );
        }
        match written {
            Ok(result) => result.context("failed to write window to annotator stdin")?,
            Err(_) => bail!("annotator stdin writer panicked"),
        }

        let annotated =
            String::from_utf8(output.stdout).context("annotator output is not valid UTF-8")?;
        if annotated.trim().is_empty() && !window.text.trim().is_empty() {
            bail!("annotator {} returned no text", self.program);
        }
        Ok(annotated)
    }
}

impl BreakAnnotator for CommandAnnotator {
    fn annotate(&self, window: &TextWindow) -> Result<String> {
        let mut attempt = 1u32;
        loop {
            match self.run_once(window) {
                Ok(annotated) => return Ok(annotated),
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.backoff * attempt;
                    warn!(
                        window = window.index + 1,
                        attempt,
                        max_attempts = self.max_attempts,
                        retry_in_secs = delay.as_secs(),
                        error = %err,
                        "annotator failed; retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "annotator gave up after {} attempt(s)",
                        self.max_attempts
                    )));
                }
            }
        }
    }
}
