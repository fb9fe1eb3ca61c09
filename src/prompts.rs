//! Prompts for test generation.
//!
//! Kept in one place so the wording can be inspected by unit tests without a
//! live model.

/// How many variants the model is asked to write.
pub const VARIANT_COUNT: usize = 3;

/// System message sent ahead of every generation request.
pub const SYSTEM_PROMPT: &str = "You write exam and test material. \
When given a test, you produce new tests that keep its format, numbering style, \
difficulty and question types while changing the actual content. \
Output only the tests, as plain text.";

/// Build the user prompt wrapping the extracted source text.
pub fn similar_tests_prompt(original: &str) -> String {
    format!(
        "Here is the original test:\n\n{original}\n\n\
         Please generate {VARIANT_COUNT} similar but different test cases \
         following the same pattern and structure."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_source_and_variant_count() {
        let p = similar_tests_prompt("Question 1: What is 2 + 2?");
        assert!(p.starts_with("Here is the original test:\n\nQuestion 1: What is 2 + 2?\n\n"));
        assert!(p.contains("generate 3 similar but different test cases"));
        assert!(p.ends_with("following the same pattern and structure."));
    }
}
