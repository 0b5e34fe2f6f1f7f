use crate::error::{DocSmithError, DocSmithResult};
use docsmith_models::is_supported_language;
use validator::{Validate, ValidationErrors};

pub const UNSUPPORTED_FILE_TYPE_MESSAGE: &str =
    "Unsupported file type. Please upload a .pdf or .docx file.";

pub fn validate_model<T: Validate>(model: &T) -> DocSmithResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(DocSmithError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "email" => "Invalid email address format".to_string(),
                "length" => format!("Length validation failed for field '{}'", field),
                "required" => format!("Field '{}' is required", field),
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

pub fn file_too_large_message(size_bytes: u64, limit_bytes: u64) -> String {
    format!(
        "File exceeds {} limit (got {}).",
        limit_label(limit_bytes),
        human_size(size_bytes)
    )
}

pub fn validate_language_code(code: &str) -> DocSmithResult<()> {
    if !is_supported_language(code) {
        return Err(DocSmithError::validation(
            "language",
            format!("Unsupported language code: {}", code),
        ));
    }
    Ok(())
}

/// Byte count in B/KB/MB/GB with one decimal, e.g. `12.4 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}

fn limit_label(limit_bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if limit_bytes >= MIB && limit_bytes % MIB == 0 {
        format!("{} MB", limit_bytes / MIB)
    } else {
        human_size(limit_bytes)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn whole_megabyte_limits_are_labelled_in_mb(megabytes in 1u64..1024, size in any::<u64>()) {
            let message = file_too_large_message(size, megabytes * 1024 * 1024);
            let expected = format!("File exceeds {} MB limit (got {}).", megabytes, human_size(size));
            prop_assert_eq!(message, expected);
        }

        #[test]
        fn human_size_has_one_decimal_and_a_unit(bytes in any::<u64>()) {
            let formatted = human_size(bytes);
            let (number, unit) = formatted.split_once(' ').unwrap();
            prop_assert!(["B", "KB", "MB", "GB"].contains(&unit));
            prop_assert_eq!(number.split_once('.').map(|(_, decimals)| decimals.len()), Some(1));
        }
    }
}
