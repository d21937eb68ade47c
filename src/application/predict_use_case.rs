// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Interactive loop over a trained checkpoint:
//
//   > I love this phone!
//   Positive (87.1%)  [Negative 4.2% | Neutral 8.7% | Positive 87.1%]
//   > exit
//
// Stops on `exit` / `quit` (any case) or end of input.
// Blank lines are skipped. A line that fails to classify is
// reported and the loop carries on.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::domain::{
    sentiment::Sentiment,
    traits::{Prediction, SentimentClassifier},
};
use crate::ml::inferencer::Inferencer;

const PROMPT: &str = "> ";

pub struct PredictUseCase {
    checkpoint_dir: PathBuf,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into() }
    }

    /// Load the checkpoint and run the loop on stdin/stdout.
    pub fn execute(&self) -> Result<usize> {
        let inferencer = Inferencer::from_checkpoint(&self.checkpoint_dir)?;
        let stdin  = std::io::stdin();
        let stdout = std::io::stdout();
        run_session(&inferencer, stdin.lock(), stdout.lock())
    }
}

fn is_sentinel(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// One line of output per prediction.
pub fn format_prediction(p: &Prediction) -> String {
    let breakdown: Vec<String> = Sentiment::ALL
        .iter()
        .map(|s| format!("{} {:.1}%", s.as_str(), p.probabilities[s.index()] * 100.0))
        .collect();
    format!(
        "{} ({:.1}%)  [{}]",
        p.sentiment,
        p.confidence() * 100.0,
        breakdown.join(" | ")
    )
}

/// Drive the prompt loop; returns how many lines were classified.
pub fn run_session<C, R, W>(classifier: &C, input: R, mut output: W) -> Result<usize>
where
    C: SentimentClassifier + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Type a tweet to classify it ('exit' or 'quit' to stop).")?;
    let mut lines = input.lines();
    let mut classified = 0;

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let text = line.trim();

        if is_sentinel(text) {
            break;
        }
        if text.is_empty() {
            continue;
        }

        match classifier.classify(text) {
            Ok(p) => {
                writeln!(output, "{}", format_prediction(&p))?;
                classified += 1;
            }
            Err(e) => {
                tracing::warn!("Prediction failed: {e:#}");
                writeln!(output, "Could not classify that input: {e}")?;
            }
        }
    }

    writeln!(output)?;
    tracing::debug!("Session ended after {} predictions", classified);
    Ok(classified)
}
