//! The fixed transcription instruction.

/// Instruction sent with every prescription image.
///
/// The model is asked for structure and for `[unclear]` markers, but the
/// reply is passed through untouched; nothing checks that it complied.
pub const PRESCRIPTION_PROMPT: &str = "Analyze this handwritten medical prescription image and extract all information in a clean, structured format.

Please provide:
1. Patient Name (if visible)
2. Date (if visible)
3. Doctor's Name (if visible)
4. All medications with:
   - Medicine name
   - Dosage
   - Frequency
   - Duration
5. Any special instructions or notes

Format the output clearly and ensure all handwritten text is accurately transcribed. If any information is unclear or illegible, note it as [unclear].";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_required_fields() {
        for field in [
            "Patient Name",
            "Date",
            "Doctor's Name",
            "Dosage",
            "Frequency",
            "Duration",
            "special instructions",
            "[unclear]",
        ] {
            assert!(PRESCRIPTION_PROMPT.contains(field), "missing {field}");
        }
    }
}
