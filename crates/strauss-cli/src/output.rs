//! Output formatting for the CLI.

use colored::*;
use strauss_domain::RunMeta;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Render the per-stage token usage table, with an ALL totals row.
    ///
    /// Only stages that made generation calls appear; a fully cached run
    /// renders just the header and the totals row.
    pub fn usage_table(&self, meta: &RunMeta) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Stage", "Input", "Output", "Total", "Est. Cost ($)"]);

        for stage in &meta.stages {
            builder.push_record([
                stage.stage.clone(),
                stage.usage.input_tokens.to_string(),
                stage.usage.output_tokens.to_string(),
                stage.usage.total_tokens.to_string(),
                stage.usage.estimated_cost.to_string(),
            ]);
        }
        builder.push_record([
            "ALL".to_string(),
            meta.totals.input_tokens.to_string(),
            meta.totals.output_tokens.to_string(),
            meta.totals.total_tokens.to_string(),
            meta.totals.estimated_cost.to_string(),
        ]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "red" => text.red().to_string(),
            _ => text.to_string(),
        }
    }
}
