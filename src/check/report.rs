//! Human-readable check report

use std::io::Write;

use colored::Colorize;

use crate::version::update::{UpdateAction, UpdateRecommendation};

/// Formats update recommendations, one line per component
pub struct ReportFormatter {
    /// Whether to use colors
    color: bool,
}

impl ReportFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// `rack [~> 1.5, >= 1.0]: `
    fn prefix(&self, rec: &UpdateRecommendation) -> String {
        let constraints: Vec<String> = rec.current_requirements.iter().map(|r| r.constraint()).collect();
        let prefix = format!("{} [{}]: ", rec.name, constraints.join(", "));
        if self.color {
            prefix.blue().bold().to_string()
        } else {
            prefix
        }
    }

    fn verdict(&self, action: &UpdateAction) -> String {
        let text = match action {
            UpdateAction::NoMatch => "No matching upstream versions".to_string(),
            UpdateAction::NoNewer(downstream) => {
                format!("No matching upstream version > {} (downstream)", downstream)
            }
            UpdateAction::Updatable(candidate) => format!("Update to {}", candidate),
        };

        if !self.color {
            return text;
        }
        match action {
            UpdateAction::Updatable(_) => text.green().bold().to_string(),
            _ => text.red().bold().to_string(),
        }
    }

    pub fn format_line(&self, rec: &UpdateRecommendation) -> String {
        format!("{}{}", self.prefix(rec), self.verdict(&rec.action))
    }

    pub fn write_report<W: Write>(
        &self,
        out: &mut W,
        recs: &[UpdateRecommendation],
    ) -> std::io::Result<()> {
        for rec in recs {
            writeln!(out, "{}", self.format_line(rec))?;
        }
        Ok(())
    }
}
