use crate::errors::Result;
use crate::processor::RunSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for the changed-files report.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `* "path"` line per changed file.
    #[default]
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values format.
    Csv,
}

/// Renders a [`RunSummary`] as a list of changed files.
pub struct ReportFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted report to a given writer.
    pub fn write_output<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(writer, summary),
            OutputFormat::Json => self.write_json(writer, summary),
            OutputFormat::Csv => self.write_csv(writer, summary),
        }
    }

    fn write_text<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        for file in &summary.changed {
            writeln!(writer, "* {:?}", file.path.display().to_string())?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            generated_at: DateTime<Utc>,
            #[serde(flatten)]
            summary: &'a RunSummary,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            generated_at: Utc::now(),
            summary,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_csv<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["path", "replacements"])?;
        for file in &summary.changed {
            csv_writer.write_record([
                file.path.display().to_string(),
                file.replacements.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ChangedFile;
    use std::path::PathBuf;

    fn summary() -> RunSummary {
        RunSummary {
            dry_run: true,
            files_scanned: 3,
            total_replacements: 5,
            changed: vec![
                ChangedFile {
                    path: PathBuf::from("src/a.txt"),
                    replacements: 2,
                },
                ChangedFile {
                    path: PathBuf::from("b, c.txt"),
                    replacements: 3,
                },
            ],
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        ReportFormatter::new(format)
            .write_output(&mut out, &summary())
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_format() {
        assert_eq!(render(OutputFormat::Text), "* \"src/a.txt\"\n* \"b, c.txt\"\n");
    }

    #[test]
    fn test_json_format() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(value["tool"]["name"], "treesub");
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["files_scanned"], 3);
        assert_eq!(value["files"][1]["path"], "b, c.txt");
        assert_eq!(value["files"][1]["replacements"], 3);
        assert!(value.get("changed").is_none());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_csv_format() {
        assert_eq!(
            render(OutputFormat::Csv),
            "path,replacements\nsrc/a.txt,2\n\"b, c.txt\",3\n"
        );
    }

    #[test]
    fn test_empty_summary_text_is_empty() {
        let mut out = Vec::new();
        ReportFormatter::new(OutputFormat::Text)
            .write_output(&mut out, &RunSummary::default())
            .unwrap();
        assert!(out.is_empty());
    }
}
