use serde::{Deserialize, Serialize};

/// How much the generated answer should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Concise,
    #[default]
    Detailed,
    Comparison,
}

impl ResponseMode {
    pub fn instruction(self) -> &'static str {
        match self {
            ResponseMode::Concise => "Answer briefly, in two or three sentences.",
            ResponseMode::Detailed => "Answer in detail and explain your reasoning.",
            ResponseMode::Comparison => "Compare and contrast the relevant information.",
        }
    }
}

/// Input handed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub question: String,
    /// Numbered context block built from the assembled result.
    pub context: String,
    pub mode: ResponseMode,
}

impl GenerationRequest {
    /// Standing instructions for the model.
    pub const SYSTEM_PROMPT: &'static str = "Answer questions about system design documents \
        using only the provided context. Cite sources by their [Source n] label. \
        Say so when the context does not contain the answer. \
        Reply in the language of the question.";

    /// Single prompt text for generators that take one string.
    pub fn render_prompt(&self) -> String {
        format!(
            "Context from documentation:\n\n{}\n\n---\n\nQuestion: {}\n\nInstructions: {}\n\nAnswer:",
            self.context,
            self.question,
            self.mode.instruction()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_context_question_and_mode() {
        let req = GenerationRequest {
            question: "Which table stores users?".to_string(),
            context: "[Source 1] Section: users\nTable: users".to_string(),
            mode: ResponseMode::Concise,
        };
        let prompt = req.render_prompt();
        assert!(prompt.contains("[Source 1] Section: users"));
        assert!(prompt.contains("Question: Which table stores users?"));
        assert!(prompt.contains(ResponseMode::Concise.instruction()));
    }
}
