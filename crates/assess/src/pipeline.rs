//! JSON-Lines Assessment Pipeline
//!
//! One `PatientProfile` per input line; one verdict or error record per
//! output line, in input order.

use advisory::{Advisor, Advisory};
use anyhow::{Context, Result};
use data_validator::{ValidationError, Validator};
use feature_engine::{
    EncodeError, EncodingTables, FeatureRow, FeatureVector, PatientProfile, SchemaError,
};
use rulenet::{RuleNet, Verdict};
use serde::Serialize;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an input line was rejected
#[derive(Debug, Error)]
pub enum LineError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Serialize)]
#[serde(untagged)]
enum Record<'a> {
    Assessed {
        line: usize,
        verdict: &'a Verdict,
        advisory: &'a Advisory,
    },
    Rejected {
        line: usize,
        error: String,
    },
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub assessed: usize,
    pub rejected: usize,
}

/// Pending line awaiting its batch
enum Pending {
    Row { line: usize, row: FeatureRow },
    Rejected { line: usize, error: LineError },
}

/// Encode, validate, classify and explain patient profiles
pub struct Pipeline {
    engine: RuleNet,
    tables: EncodingTables,
    validator: Validator,
    advisor: Advisor,
    batch_size: usize,
}

impl Pipeline {
    /// Assemble a pipeline
    pub fn new(
        engine: RuleNet,
        tables: EncodingTables,
        validator: Validator,
        advisor: Advisor,
        batch_size: usize,
    ) -> Self {
        Self {
            engine,
            tables,
            validator,
            advisor,
            batch_size: batch_size.max(1),
        }
    }

    /// Parse one input line into a checked row
    pub fn prepare(&self, line: &str) -> Result<FeatureRow, LineError> {
        let profile: PatientProfile = serde_json::from_str(line)?;
        let vector = self.tables.encode(&profile)?;
        let row = FeatureRow::try_from(vector)?;
        let result = self.validator.validate(&row);
        if !result.valid {
            return Err(LineError::Validation(result.errors));
        }
        Ok(row)
    }

    /// Process every line of `input`, writing records to `output`.
    ///
    /// Rejected lines are reported and skipped; a classifier failure aborts
    /// the run. At most `batch_size` lines are held before their records
    /// are written.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut pending = Vec::new();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let text = line.with_context(|| format!("Failed to read input line {}", line_no))?;
            if text.trim().is_empty() {
                continue;
            }
            summary.lines += 1;

            match self.prepare(&text) {
                Ok(row) => pending.push(Pending::Row { line: line_no, row }),
                Err(error) => {
                    warn!("Rejected line {}: {}", line_no, error);
                    pending.push(Pending::Rejected { line: line_no, error });
                }
            }

            // Rejected lines count too, so a run of bad input stays bounded
            if pending.len() >= self.batch_size {
                self.flush(&mut pending, &mut output, &mut summary)?;
            }
        }
        self.flush(&mut pending, &mut output, &mut summary)?;
        output.flush().context("Failed to flush output")?;

        info!(
            "Processed {} lines: {} assessed, {} rejected",
            summary.lines, summary.assessed, summary.rejected
        );
        Ok(summary)
    }

    fn flush<W: Write>(
        &self,
        pending: &mut Vec<Pending>,
        output: &mut W,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let (lines, vectors): (Vec<usize>, Vec<FeatureVector>) = pending
            .iter()
            .filter_map(|p| match p {
                Pending::Row { line, row } => Some((*line, row.to_vector())),
                Pending::Rejected { .. } => None,
            })
            .unzip();
        debug!("Classifying batch of {} rows", vectors.len());

        let verdicts = self.engine.classify_batch(&vectors).map_err(|e| {
            let line = e.row().and_then(|r| lines.get(r)).copied();
            anyhow::Error::new(e).context(match line {
                Some(line) => format!("Classification failed at line {}", line),
                None => "Classification failed".to_string(),
            })
        })?;

        let mut verdicts = verdicts.iter();
        for item in pending.drain(..) {
            match item {
                Pending::Row { line, row } => {
                    let verdict = verdicts
                        .next()
                        .context("Engine returned fewer verdicts than rows")?;
                    let advisory = self.advisor.advise(&row, verdict);
                    write_record(
                        output,
                        &Record::Assessed {
                            line,
                            verdict,
                            advisory: &advisory,
                        },
                    )?;
                    summary.assessed += 1;
                }
                Pending::Rejected { line, error } => {
                    write_record(
                        output,
                        &Record::Rejected {
                            line,
                            error: error.to_string(),
                        },
                    )?;
                    summary.rejected += 1;
                }
            }
        }
        Ok(())
    }
}

fn write_record<W: Write>(output: &mut W, record: &Record<'_>) -> Result<()> {
    serde_json::to_writer(&mut *output, record).context("Failed to serialize record")?;
    output.write_all(b"\n").context("Failed to write output")?;
    Ok(())
}
