use crate::error::{AnalysisError, Result};
use crate::types::{AnalysisResult, CleaningReport, OutlierReport, SalesSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Serializable report of one analysis run.
///
/// Used for `--json` output, `--emit-report` files and library callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    pub duration_ms: u64,
    pub cleaning: CleaningReport,
    pub summary: SalesSummary,
    pub outliers: OutlierReport,
    /// Chart files written during the run
    pub charts: Vec<String>,
    /// Narrative summary of the findings
    pub findings: Vec<String>,
}

/// Builds [`AnalysisReport`]s and writes them to the output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Build the report for `result`, read from `input_file`.
    pub fn build_report(input_file: &str, result: &AnalysisResult) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            duration_ms: result.duration_ms,
            cleaning: result.cleaning.clone(),
            summary: result.summary.clone(),
            outliers: result.outliers.clone(),
            charts: result
                .charts
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            findings: super::findings(result),
        }
    }

    /// Write `report` as pretty JSON to `<output_dir>/<base_name>_report.json`.
    ///
    /// `base_name` must be a plain file name stem.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        base_name: &str,
    ) -> Result<PathBuf> {
        if base_name.trim().is_empty() || base_name.contains(['/', '\\']) {
            return Err(AnalysisError::ReportGenerationFailed(format!(
                "invalid report name '{}'",
                base_name
            )));
        }

        let json = serde_json::to_string_pretty(report)?;
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(json.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::test_support::sample_result;
    use tempfile::TempDir;

    #[test]
    fn test_build_report_copies_result() {
        let result = sample_result();
        let report = ReportGenerator::build_report("Online Retail.csv", &result);

        assert_eq!(report.input_file, "Online Retail.csv");
        assert_eq!(report.duration_ms, 12);
        assert_eq!(report.cleaning, result.cleaning);
        assert_eq!(report.charts.len(), 1);
        assert!(report.charts[0].ends_with("weekday_sales.svg"));
        assert!(!report.findings.is_empty());
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested");
        let generator = ReportGenerator::new(out.clone());
        let report = ReportGenerator::build_report("retail.csv", &sample_result());

        let path = generator.write_report_to_file(&report, "retail").unwrap();
        assert_eq!(path, out.join("retail_report.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["cleaning"]["duplicates_removed"], 1);
        assert_eq!(json["summary"]["weekday_sales"].as_array().unwrap().len(), 7);
        assert_eq!(json["outliers"]["rows_flagged"], 0);
    }

    #[test]
    fn test_invalid_report_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().to_path_buf());
        let report = ReportGenerator::build_report("retail.csv", &sample_result());

        for name in ["", "  ", "../escape"] {
            let err = generator.write_report_to_file(&report, name).unwrap_err();
            assert_eq!(err.error_code(), "REPORT_GENERATION_FAILED");
        }
    }

    #[test]
    fn test_unwritable_output_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file in the way").unwrap();

        let generator = ReportGenerator::new(blocker.join("reports"));
        let report = ReportGenerator::build_report("retail.csv", &sample_result());
        let err = generator.write_report_to_file(&report, "retail").unwrap_err();

        assert!(matches!(err, AnalysisError::Io(_)));
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
