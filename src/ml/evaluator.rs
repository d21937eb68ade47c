// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Scores predicted classes against gold labels.
//
//   confusion[actual][predicted]
//
//   precision_c = tp / (tp + fp)     recall_c = tp / (tp + fn)
//   f1_c        = 2·p·r / (p + r)
//
// Any 0/0 above is reported as 0.0. Macro averages weight the
// three classes equally; weighted averages weight them by
// support (number of gold samples).

use std::fmt;

use crate::domain::sentiment::{Sentiment, NUM_CLASSES};

/// Precision / recall / F1 for one class or one average.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy:     f64,
    /// Indexed by `Sentiment::index`
    pub per_class:    [ClassMetrics; NUM_CLASSES],
    pub macro_avg:    ClassMetrics,
    pub weighted_avg: ClassMetrics,
    /// Rows are gold labels, columns are predictions.
    pub confusion:    [[usize; NUM_CLASSES]; NUM_CLASSES],
    pub total:        usize,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

impl ClassificationReport {
    /// `gold` and `predicted` are class indices of equal length.
    /// Indices outside the label range are ignored.
    pub fn from_predictions(gold: &[usize], predicted: &[usize]) -> Self {
        let mut confusion = [[0usize; NUM_CLASSES]; NUM_CLASSES];
        for (&actual, &pred) in gold.iter().zip(predicted) {
            if actual < NUM_CLASSES && pred < NUM_CLASSES {
                confusion[actual][pred] += 1;
            }
        }

        let total:   usize = confusion.iter().flatten().sum();
        let correct: usize = (0..NUM_CLASSES).map(|c| confusion[c][c]).sum();

        let mut per_class = [ClassMetrics::default(); NUM_CLASSES];
        for (c, m) in per_class.iter_mut().enumerate() {
            let tp        = confusion[c][c] as f64;
            let predicted = (0..NUM_CLASSES).map(|r| confusion[r][c]).sum::<usize>() as f64;
            let support   = confusion[c].iter().sum::<usize>();

            let precision = ratio(tp, predicted);
            let recall    = ratio(tp, support as f64);
            let f1        = ratio(2.0 * precision * recall, precision + recall);
            *m = ClassMetrics { precision, recall, f1, support };
        }

        let n = NUM_CLASSES as f64;
        let macro_avg = ClassMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n,
            recall:    per_class.iter().map(|m| m.recall).sum::<f64>() / n,
            f1:        per_class.iter().map(|m| m.f1).sum::<f64>() / n,
            support:   total,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            ratio(
                per_class.iter().map(|m| f(m) * m.support as f64).sum(),
                total as f64,
            )
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall:    weighted(|m| m.recall),
            f1:        weighted(|m| m.f1),
            support:   total,
        };

        Self {
            accuracy: ratio(correct as f64, total as f64),
            per_class,
            macro_avg,
            weighted_avg,
            confusion,
            total,
        }
    }

    pub fn class(&self, sentiment: Sentiment) -> &ClassMetrics {
        &self.per_class[sentiment.index()]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>12}  {:>9.4}  {:>9.4}  {:>9.4}  {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(f, "{:>12}  {:>9}  {:>9}  {:>9}  {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for s in Sentiment::ALL {
            row(f, s.as_str(), self.class(s))?;
        }
        writeln!(f)?;
        writeln!(f, "{:>12}  {:>9}  {:>9}  {:>9.4}  {:>9}", "accuracy", "", "", self.accuracy, self.total)?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)?;

        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = actual, columns = predicted)")?;
        write!(f, "{:>12}", "")?;
        for s in Sentiment::ALL {
            write!(f, "  {:>9}", s.as_str())?;
        }
        writeln!(f)?;
        for s in Sentiment::ALL {
            write!(f, "{:>12}", s.as_str())?;
            for count in self.confusion[s.index()] {
                write!(f, "  {:>9}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_metrics_match_hand_computed_values() {
        //          gold: N  N  Ne Ne P  P
        //     predicted: N  Ne Ne Ne P  N
        let report = ClassificationReport::from_predictions(&[0, 0, 1, 1, 2, 2], &[0, 1, 1, 1, 2, 0]);

        assert_eq!(report.confusion, [[1, 1, 0], [0, 2, 0], [1, 0, 1]]);
        assert_eq!(report.total, 6);
        assert!(close(report.accuracy, 4.0 / 6.0));

        let neg = report.class(Sentiment::Negative);
        assert!(close(neg.precision, 0.5) && close(neg.recall, 0.5) && close(neg.f1, 0.5));

        let neu = report.class(Sentiment::Neutral);
        assert!(close(neu.precision, 2.0 / 3.0) && close(neu.recall, 1.0) && close(neu.f1, 0.8));

        let pos = report.class(Sentiment::Positive);
        assert!(close(pos.precision, 1.0) && close(pos.recall, 0.5) && close(pos.f1, 2.0 / 3.0));
        assert_eq!(pos.support, 2);

        assert!(close(report.macro_avg.precision, (0.5 + 2.0 / 3.0 + 1.0) / 3.0));
        assert!(close(report.macro_avg.f1, (0.5 + 0.8 + 2.0 / 3.0) / 3.0));
        // Equal support → weighted equals macro
        assert!(close(report.weighted_avg.recall, report.macro_avg.recall));
    }

    #[test]
    fn test_weighted_average_uses_support() {
        // Negative: 3 gold, all right. Positive: 1 gold, missed.
        let report = ClassificationReport::from_predictions(&[0, 0, 0, 2], &[0, 0, 0, 0]);
        assert!(close(report.class(Sentiment::Negative).recall, 1.0));
        assert!(close(report.weighted_avg.recall, 0.75));
        assert!(close(report.macro_avg.recall, 1.0 / 3.0));
    }

    #[test]
    fn test_zero_division_yields_zero() {
        let report = ClassificationReport::from_predictions(&[0, 0], &[0, 0]);
        let neu = report.class(Sentiment::Neutral);
        assert_eq!((neu.precision, neu.recall, neu.f1, neu.support), (0.0, 0.0, 0.0, 0));
        assert!(close(report.accuracy, 1.0));

        let empty = ClassificationReport::from_predictions(&[], &[]);
        assert_eq!(empty.accuracy, 0.0);
        assert_eq!(empty.weighted_avg.f1, 0.0);
    }

    #[test]
    fn test_display_lists_every_class() {
        let text = ClassificationReport::from_predictions(&[0, 1, 2], &[0, 1, 1]).to_string();
        for s in Sentiment::ALL {
            assert!(text.contains(s.as_str()));
        }
        assert!(text.contains("macro avg"));
        assert!(text.contains("Confusion matrix"));
    }
}
