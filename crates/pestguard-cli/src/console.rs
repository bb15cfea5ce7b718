use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented prompt: writes a label, reads one line.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl Console<BufReader<Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// Print `label` and read one line. `None` at end of input.
    pub async fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        self.lines.next_line().await
    }

    /// Ask each label in turn. Stops at the first end of input, so later
    /// labels are never shown.
    pub async fn ask_all(&mut self, labels: &[&str]) -> io::Result<Option<Vec<String>>> {
        let mut answers = Vec::with_capacity(labels.len());
        for label in labels {
            match self.ask(label).await? {
                Some(answer) => answers.push(answer),
                None => return Ok(None),
            }
        }
        Ok(Some(answers))
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}
