//! Prompts for model metadata extraction

/// System prompt for model extraction; cached on the provider side when enabled
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a data extraction assistant for an AI model catalogue.

Your task is to extract information about a single AI model from unstructured text such as research papers, technical blog posts, news articles and benchmark reports.

## Rules

1. Only extract information that is explicitly stated in the text.
2. Use null for any field that is not stated. Never guess.
3. Normalize model names to lowercase with hyphens ("gpt-4", not "GPT4"; "claude-3-sonnet", not "Claude 3 Sonnet").
4. Infer release_date from contextual date phrases ("in March 2023" becomes "2023-03-01") and format it as YYYY-MM-DD.
5. Keep the description to 1-2 concise sentences about the model's capabilities.

If the text contains no information about an AI model, return null for every field.
"#;

/// Build the user message for an extraction request
pub fn build_extraction_prompt(text: &str) -> String {
    format!("Extract model information from this text:\n\n{}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_literal_text() {
        let text = "  Llama 2 was released by Meta in July 2023.\n";
        let prompt = build_extraction_prompt(text);
        assert!(prompt.starts_with("Extract model information from this text:\n\n"));
        assert!(prompt.ends_with(text));
    }
}
