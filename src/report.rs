//! Decision trail and selection output
//!
//! Diagnostics (decision lines, summary, warnings) go to the diagnostic writer,
//! normally stderr. The primary output is JSON so it stays parseable on stdout.

use crate::models::{CriticDefinition, CritiqueConfig};
use crate::selector::{Selection, SelectionDecision};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// A selected critic as handed to downstream consumers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CriticOutput {
    pub name: String,
    pub model: String,
    /// Group keys expanded to their glob pattern
    pub files: Vec<String>,
    pub skills: Vec<String>,
    pub evaluate: serde_json::Value,
}

impl From<&CriticDefinition> for CriticOutput {
    fn from(critic: &CriticDefinition) -> Self {
        Self {
            name: critic.name.clone(),
            model: critic.model.clone(),
            files: critic.files.iter().map(|key| key.display_path()).collect(),
            skills: critic.skills.clone(),
            evaluate: critic.evaluate.clone(),
        }
    }
}

/// Full selection output
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectionOutput {
    pub output_template: String,
    pub critics: Vec<CriticOutput>,
}

impl SelectionOutput {
    pub fn new(config: &CritiqueConfig, selection: &Selection<'_>) -> Self {
        Self {
            output_template: config.output_template.clone(),
            critics: selection.selected().map(CriticOutput::from).collect(),
        }
    }
}

/// Plain decision line, e.g. `[SKIPPED] functional-review: no changes detected`
pub fn decision_line(decision: &SelectionDecision<'_>) -> String {
    format!(
        "[{}] {}: {}",
        status_label(decision),
        decision.critic.name,
        decision.reason
    )
}

fn status_label(decision: &SelectionDecision<'_>) -> &'static str {
    if decision.selected() {
        "SELECTED"
    } else {
        "SKIPPED"
    }
}

/// Summary line, e.g. `--- 1/3 critics selected ---`
pub fn summary_line(selection: &Selection<'_>) -> String {
    format!(
        "--- {}/{} critics selected ---",
        selection.selected_count(),
        selection.total()
    )
}

/// Render the primary output: names only, or the full descriptor object
pub fn render_output(
    config: &CritiqueConfig,
    selection: &Selection<'_>,
    names_only: bool,
) -> serde_json::Result<String> {
    if names_only {
        let names: Vec<&str> = selection.selected().map(|c| c.name.as_str()).collect();
        serde_json::to_string(&names)
    } else {
        serde_json::to_string_pretty(&SelectionOutput::new(config, selection))
    }
}

/// Writes the decision trail to a diagnostic stream
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One line per decision, then the summary
    pub fn decisions(&mut self, selection: &Selection<'_>) -> io::Result<()> {
        for decision in &selection.decisions {
            let line = decision_line(decision);
            let line = if decision.selected() {
                line.green()
            } else {
                line.bright_black()
            };
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "{}", summary_line(selection))
    }

    pub fn warning(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}", format!("WARNING: {}", message).yellow())
    }

    /// Fatal error with a fix hint
    pub fn error(&mut self, message: impl std::fmt::Display, hint: Option<&str>) -> io::Result<()> {
        writeln!(self.out, "{}", format!("ERROR: {}", message).red())?;
        if let Some(hint) = hint {
            writeln!(self.out, "FIX: {}", hint)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use crate::state::{CurrentState, Digest, StoredState, UnknownReason};
    use crate::TrackedKey;

    fn config() -> CritiqueConfig {
        serde_json::from_str(
            r#"{
  "output_template": "critiques/{name}.md",
  "critics": [
    {"name": "req", "files": ["functional.md", "requirements"], "model": "opus",
     "skills": ["gherkin"], "evaluate": {"focus": "scenarios"}},
    {"name": "tasks", "files": ["tasks.yaml"], "model": "sonnet", "evaluate": "check"}
  ]
}"#,
        )
        .unwrap()
    }

    fn current() -> CurrentState {
        CurrentState::from_digests([
            (TrackedKey::Functional, Digest::from("aaaaaaaaaaaaaaaa")),
            (TrackedKey::Requirements, Digest::from("bbbbbbbbbbbbbbbb")),
        ])
    }

    #[test]
    fn test_decision_and_summary_lines() {
        let config = config();
        let stored = StoredState::Unknown(UnknownReason::Absent);
        let selection = Selector::new(false).select(&config, &current(), &stored);

        assert_eq!(
            decision_line(&selection.decisions[0]),
            "[SELECTED] req: changed: functional.md, requirements"
        );
        assert_eq!(
            decision_line(&selection.decisions[1]),
            "[SKIPPED] tasks: missing files: tasks.yaml"
        );
        assert_eq!(summary_line(&selection), "--- 1/2 critics selected ---");
    }

    #[test]
    fn test_full_output_expands_requirements() {
        let config = config();
        let stored = StoredState::Unknown(UnknownReason::Absent);
        let selection = Selector::new(false).select(&config, &current(), &stored);

        let output = SelectionOutput::new(&config, &selection);
        assert_eq!(output.output_template, "critiques/{name}.md");
        assert_eq!(output.critics.len(), 1);
        assert_eq!(
            output.critics[0].files,
            vec!["functional.md", "requirements/*/requirements.feature.md"]
        );
        assert_eq!(output.critics[0].skills, vec!["gherkin"]);

        let rendered: serde_json::Value =
            serde_json::from_str(&render_output(&config, &selection, false).unwrap()).unwrap();
        assert_eq!(rendered["critics"][0]["evaluate"]["focus"], "scenarios");
    }

    #[test]
    fn test_names_only_output() {
        let config = config();
        let stored = StoredState::Unknown(UnknownReason::Absent);
        let selection = Selector::new(false).select(&config, &current(), &stored);

        assert_eq!(render_output(&config, &selection, true).unwrap(), r#"["req"]"#);
    }

    #[test]
    fn test_reporter_writes_trail() {
        colored::control::set_override(false);

        let config = config();
        let stored = StoredState::Unknown(UnknownReason::Absent);
        let selection = Selector::new(false).select(&config, &current(), &stored);

        let mut reporter = Reporter::new(Vec::new());
        reporter.decisions(&selection).unwrap();
        reporter.warning("Cannot write hash file").unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("[SELECTED] req: changed: functional.md, requirements"));
        assert!(lines[1].contains("[SKIPPED] tasks: missing files: tasks.yaml"));
        assert_eq!(lines[2], "--- 1/2 critics selected ---");
        assert!(lines[3].contains("WARNING: Cannot write hash file"));
    }
}
