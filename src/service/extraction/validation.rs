//! Guard for extraction results before they reach the catalogue

use crate::model::ExtractedModelData;
use crate::service::extraction::ExtractionError;

/// Ensure the extraction produced usable data
pub fn validate_extracted(
    data: Option<&ExtractedModelData>,
) -> Result<&ExtractedModelData, ExtractionError> {
    data.ok_or(ExtractionError::NoDataFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_data_is_no_data_found() {
        assert!(matches!(
            validate_extracted(None),
            Err(ExtractionError::NoDataFound)
        ));
    }

    #[test]
    fn test_present_data_passes_through() {
        let data = ExtractedModelData {
            model_name: "claude-3-opus".to_string(),
            organization: Some("Anthropic".to_string()),
            release_date: None,
            description: "Anthropic's most capable Claude 3 model.".to_string(),
            license: None,
        };

        let validated = validate_extracted(Some(&data)).unwrap();
        assert_eq!(validated, &data);
    }
}
