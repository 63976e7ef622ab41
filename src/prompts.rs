//! The extraction instruction sent after the page images.
//!
//! Kept in one place so the wording can be reviewed and tested without a
//! model in the loop. Callers can override it via
//! [`crate::config::ExtractionConfig::prompt`]; the constant here is used only
//! when no override is provided.

use crate::config::ExtractionConfig;

/// Default instruction for bilingual gazette extraction.
///
/// The reply must be a bare JSON object with `original` and `english`
/// branches. The "return only JSON" requirement is advisory; the reply is
/// still parsed defensively.
pub const EXTRACTION_PROMPT: &str = r#"Analyze this Belgian Official Gazette document ("Bijlagen bij het Belgisch Staatsblad - Annexes du Moniteur belge").
Extract information and provide BOTH original language and English translation.
Return ONLY a JSON object with this structure:

{
    "original": {
        "Language": "Language which the document is in",
        "Company Name": "full legal company name (keep in original language)",
        "Company Identifier": "business registration number",
        "Document Purpose": {
            "Key terms": "main purpose of document in original language",
            "Additional Information": {
                // All relevant details in original language
            }
        }
    },
    "english": {
        "Company Name": "same as original - do not translate proper names",
        "Company Identifier": "same as original - do not translate identifiers",
        "Document Purpose": {
            "Key terms": "main purpose translated to English",
            "Additional Information": {
                // All relevant details translated to English
            }
        }
    }
}

Important Notes:
1. Keep company names, identifiers, and reference numbers IDENTICAL in both versions
2. For the original version, maintain text in document's language (FR/NL/DE)
3. Translate all descriptive content to English in the 'english' version
4. Include all relevant information based on document type:
   - For appointments: position, dates, person names
   - For modifications: type of change, effective date
   - For other purposes: all relevant context and details
5. Ensure professional and accurate translations
6. Output the JSON object only, with no text before or after it"#;

/// The instruction in effect for `config`.
pub fn extraction_prompt(config: &ExtractionConfig) -> &str {
    config.prompt.as_deref().unwrap_or(EXTRACTION_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_both_branches_and_required_keys() {
        for key in [
            "\"original\"",
            "\"english\"",
            "\"Company Name\"",
            "\"Company Identifier\"",
            "\"Document Purpose\"",
            "\"Key terms\"",
            "\"Additional Information\"",
        ] {
            assert!(EXTRACTION_PROMPT.contains(key), "missing {key}");
        }
    }

    #[test]
    fn prompt_forbids_translating_identifiers() {
        assert!(EXTRACTION_PROMPT.contains("do not translate proper names"));
        assert!(EXTRACTION_PROMPT.contains("do not translate identifiers"));
        assert!(EXTRACTION_PROMPT.contains("Return ONLY a JSON object"));
    }

    #[test]
    fn override_takes_precedence() {
        let mut config = ExtractionConfig::default();
        assert_eq!(extraction_prompt(&config), EXTRACTION_PROMPT);
        config.prompt = Some("custom".into());
        assert_eq!(extraction_prompt(&config), "custom");
    }
}
