//! Plain-text report offered for download.

use chrono::{DateTime, Local};

use crate::types::ExtractionResult;

const RULE: &str = "==================================================";
const TITLE: &str = "PRESCRIPTION OCR REPORT";
const FOOTER: &str = "Generated by Prescription OCR";

/// Render the downloadable report.
///
/// The result text is copied verbatim between the header block and the footer.
pub fn render(result: &ExtractionResult, file_name: &str) -> String {
    format!(
        "{TITLE}\n{RULE}\n\nExtracted: {}\nFile: {file_name}\n\n{RULE}\n\n{}\n\n{RULE}\n{FOOTER}\n",
        result.timestamp(),
        result.text,
    )
}

/// Download filename, e.g. `prescription_20240305_090701.txt`.
pub fn file_name(now: DateTime<Local>) -> String {
    format!("prescription_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new(text, false);
        result.captured_at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap();
        result
    }

    #[test]
    fn test_rule_is_fifty_wide() {
        assert_eq!(RULE.len(), 50);
        assert!(RULE.chars().all(|c| c == '='));
    }

    #[test]
    fn test_render_layout() {
        let report = render(&result("Patient: Jane Doe"), "rx.jpg");
        let expected = format!(
            "PRESCRIPTION OCR REPORT\n{RULE}\n\nExtracted: 2024-03-05 09:07:01\nFile: rx.jpg\n\n\
             {RULE}\n\nPatient: Jane Doe\n\n{RULE}\nGenerated by Prescription OCR\n"
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn test_body_is_verbatim() {
        let text = "  1. Amoxicillin 500mg\n\t[unclear] x 7 days\n\n";
        let report = render(&result(text), "rx.png");
        let start = report.find(text).unwrap();
        assert_eq!(&report[start..start + text.len()], text);
    }

    #[test]
    fn test_file_name() {
        let now = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(file_name(now), "prescription_20241231_235958.txt");
    }
}
