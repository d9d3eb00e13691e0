//! Report Rendering
//!
//! Turns a batch run into terminal output and an exit code. The report
//! is the single source of truth for the run: no silent partial success.

use colored::Colorize;

use crate::publish::batch::{BatchRunOutput, DocumentAudit};
use crate::publish::check::CheckReport;
use crate::types::{BatchReport, PublishStatus};

/// Exit code for a batch run: 0 only when every document published.
pub fn exit_code(report: &BatchReport) -> i32 {
    if report.is_success() {
        0
    } else {
        1
    }
}

/// Render the per-document audit stream followed by the summary.
pub fn render_batch(output: &BatchRunOutput) -> String {
    let mut out = String::new();

    for (outcome, audit) in output.report.outcomes.iter().zip(&output.audits) {
        out.push_str(&format!(
            "{} {}\n",
            status_tag(outcome.status),
            outcome.identifier.bold()
        ));
        if let Some(detail) = &outcome.detail {
            out.push_str(&format!("    {}\n", detail));
        }
        out.push_str(&render_audit(audit));
    }

    let counts = output.report.counts();
    out.push_str(&format!(
        "\n{} {} published, {} skipped-invalid, {} failed ({} total)\n",
        "Summary:".bold(),
        counts.published.to_string().green(),
        counts.skipped_invalid.to_string().yellow(),
        counts.failed.to_string().red(),
        output.report.outcomes.len(),
    ));

    out
}

/// Render a check run: audit per document plus a clean/dirty verdict.
pub fn render_check(report: &CheckReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let tag = if outcome.load_error.is_some() || outcome.write_error.is_some() {
            "error".red().to_string()
        } else if !outcome.violations.is_empty() {
            "invalid".yellow().to_string()
        } else {
            "ok".green().to_string()
        };
        out.push_str(&format!("[{}] {}\n", tag, outcome.identifier.bold()));

        if let Some(reason) = &outcome.load_error {
            out.push_str(&format!("    load error: {}\n", reason));
        }
        if let Some(reason) = &outcome.write_error {
            out.push_str(&format!("    write error: {}\n", reason));
        }
        for note in &outcome.notes {
            out.push_str(&format!("    ~ {}\n", note));
        }
        for violation in &outcome.violations {
            out.push_str(&format!("    ! {}\n", violation));
        }
        if outcome.fixed {
            out.push_str("    normalized document written back\n");
        }
    }

    let verdict = if report.is_clean() {
        "Corpus is clean.".green().to_string()
    } else {
        "Corpus has problems; see entries above.".red().to_string()
    };
    out.push_str(&format!("\n{}\n", verdict));

    out
}

/// Machine-readable batch report.
pub fn render_json(report: &BatchReport) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(report)?;
    value["counts"] = serde_json::to_value(report.counts())?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn render_audit(audit: &DocumentAudit) -> String {
    let mut out = String::new();
    for note in &audit.notes {
        out.push_str(&format!("    ~ {}\n", note));
    }
    for violation in &audit.violations {
        out.push_str(&format!("    ! {}\n", violation));
    }
    out
}

fn status_tag(status: PublishStatus) -> String {
    match status {
        PublishStatus::Published => "[published]".green().to_string(),
        PublishStatus::SkippedInvalid => "[skipped]".yellow().to_string(),
        PublishStatus::Failed => "[failed]".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublishOutcome;

    fn report(outcomes: Vec<PublishOutcome>) -> BatchReport {
        BatchReport {
            started_at: "2026-01-01T00:00:00Z".to_string(),
            finished_at: "2026-01-01T00:00:05Z".to_string(),
            outcomes,
        }
    }

    #[test]
    fn test_exit_code_zero_only_on_full_success() {
        assert_eq!(exit_code(&report(vec![PublishOutcome::published("a")])), 0);
        assert_eq!(
            exit_code(&report(vec![
                PublishOutcome::published("a"),
                PublishOutcome::skipped("b", "validation failed: missing-name"),
            ])),
            1
        );
        assert_eq!(
            exit_code(&report(vec![PublishOutcome::failed("c", "boom")])),
            1
        );
    }

    #[test]
    fn test_json_report_includes_counts() {
        let rendered = render_json(&report(vec![
            PublishOutcome::published("a"),
            PublishOutcome::failed("b", "registry error"),
        ]))
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["counts"]["published"], 1);
        assert_eq!(value["counts"]["failed"], 1);
        assert_eq!(value["outcomes"][1]["status"], "failed");
    }

    #[test]
    fn test_human_output_names_every_document() {
        let output = BatchRunOutput {
            report: report(vec![
                PublishOutcome::published("alpha"),
                PublishOutcome::skipped("beta", "validation failed: missing-description"),
            ]),
            audits: vec![
                DocumentAudit {
                    identifier: "alpha".to_string(),
                    notes: vec!["renamed alias 'desc' to 'description'".to_string()],
                    violations: Vec::new(),
                },
                DocumentAudit {
                    identifier: "beta".to_string(),
                    notes: Vec::new(),
                    violations: vec!["missing-description".to_string()],
                },
            ],
        };

        let rendered = render_batch(&output);
        assert!(rendered.contains("alpha"));
        assert!(rendered.contains("beta"));
        assert!(rendered.contains("missing-description"));
        assert!(rendered.contains("renamed alias"));
    }
}
