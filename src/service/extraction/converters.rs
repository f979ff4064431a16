//! Conversion from extracted data to catalogue create requests

use crate::model::{ExtractedModelData, ModelCreate};

/// Map extracted data onto a model create request.
///
/// The display name mirrors the technical name; nothing in the extracted
/// payload carries a presentation name.
pub fn to_create_request(extracted: &ExtractedModelData) -> ModelCreate {
    ModelCreate {
        name: extracted.model_name.clone(),
        display_name: extracted.model_name.clone(),
        organization: extracted.organization.clone(),
        release_date: extracted.release_date,
        description: Some(extracted.description.clone()),
        license: extracted.license.clone(),
        metadata: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_gpt4_mapping() {
        let extracted = ExtractedModelData {
            model_name: "gpt-4".to_string(),
            organization: Some("OpenAI".to_string()),
            release_date: NaiveDate::from_ymd_opt(2023, 3, 14),
            description: "A large multimodal model".to_string(),
            license: Some("Proprietary".to_string()),
        };

        let create = to_create_request(&extracted);

        assert_eq!(create.name, "gpt-4");
        assert_eq!(create.display_name, "gpt-4");
        assert_eq!(create.organization.as_deref(), Some("OpenAI"));
        assert_eq!(create.release_date, NaiveDate::from_ymd_opt(2023, 3, 14));
        assert_eq!(create.description.as_deref(), Some("A large multimodal model"));
        assert_eq!(create.license.as_deref(), Some("Proprietary"));
        assert!(create.metadata.is_none());
    }

    #[test]
    fn test_absent_optionals_stay_absent() {
        let extracted = ExtractedModelData {
            model_name: "phi-2".to_string(),
            organization: None,
            release_date: None,
            description: "A small language model.".to_string(),
            license: None,
        };

        let create = to_create_request(&extracted);

        assert!(create.organization.is_none());
        assert!(create.release_date.is_none());
        assert!(create.license.is_none());
    }
}
