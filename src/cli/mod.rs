// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`    — fits a vectorizer and trains dense or LSTM
//   2. `evaluate` — scores a checkpoint on a labelled CSV
//   3. `predict`  — interactive classification from stdin

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tweet-sentiment",
    version,
    about = "Train TF-IDF and LSTM sentiment classifiers on tweets, then evaluate or query them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting {:?} training on '{}'", args.arch, args.train_csv);
    let checkpoint_dir = args.checkpoint_dir.clone();

    let outcome = TrainUseCase::new(args.into()).execute()?;

    let summary = &outcome.summary;
    println!(
        "Training complete after {} epochs. Best epoch {} (val_loss={:.4}){}. Checkpoint saved in '{}'.",
        summary.history.len(),
        summary.best_epoch,
        summary.best_val_loss,
        if summary.stopped_early { ", stopped early" } else { "" },
        checkpoint_dir
    );
    if let Some(report) = outcome.test {
        println!("\nTest set:\n{report}");
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(&args.checkpoint_dir).execute(&args.test_csv)?;
    println!("{report}");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let n = PredictUseCase::new(&args.checkpoint_dir).execute()?;
    tracing::info!("Classified {} tweets", n);
    Ok(())
}
