//! Language-aware helpers for LLM prompts
//!
//! The answer language follows the request locale, which the locale
//! middleware derives from `Accept-Language`.

/// Language tag used in prompt wording: "en" or "zh"
pub fn current_llm_language() -> &'static str {
    match crate::utils::get_locale().as_str() {
        "zh" => "zh",
        _ => "en",
    }
}

/// Prompt section that hard constrains the answer language.
pub fn build_language_prompt_section() -> &'static str {
    match current_llm_language() {
        "zh" => {
            "\n\n## 语言要求\n\
请全程使用**简体中文**回答，不要在任何部分使用英文。\n"
        },
        _ => {
            "\n\n## Language Requirement\n\
Please respond **strictly in English**. Do not use any other language in the answer.\n"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::with_locale;

    #[tokio::test]
    async fn test_language_follows_locale() {
        assert_eq!(current_llm_language(), "en");

        let lang = with_locale("zh", async { current_llm_language() }).await;
        assert_eq!(lang, "zh");

        let section = with_locale("zh", async { build_language_prompt_section() }).await;
        assert!(section.contains("简体中文"));
    }
}
