use crate::core::prompts;
use crate::domain::model::{ChatMessage, PipelineResult};
use crate::domain::ports::GenerativeModel;
use crate::utils::error::{ChainError, ModelError, Result};

/// Conversational assistant over a completed run.
///
/// The session is seeded with the run's static data and assumptions so the
/// model answers in the context of the analyzed building. History is held
/// in memory for the life of the session; nothing is persisted here.
pub struct ChatSession<'a, M: GenerativeModel> {
    model: &'a M,
    context: String,
    history: Vec<ChatMessage>,
    min_response_chars: usize,
}

impl<'a, M: GenerativeModel> ChatSession<'a, M> {
    pub fn new(model: &'a M, result: &PipelineResult) -> Self {
        Self {
            model,
            context: prompts::chat_context(&result.static_data, &result.dynamic_assumptions),
            history: Vec::new(),
            min_response_chars: 2,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send one user message and return the assistant's reply.
    pub async fn send(&mut self, content: &str) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChainError::Validation {
                field: "message".to_string(),
                reason: "message content cannot be empty".to_string(),
            });
        }

        let prompt = self.transcript_prompt(content);
        let reply = self
            .model
            .generate_reasoning(&prompt)
            .await
            .map_err(|source| ChainError::Chat { source })?;

        let reply = reply.trim().to_string();
        if reply.len() < self.min_response_chars {
            return Err(ChainError::Chat {
                source: ModelError::EmptyResponse {
                    length: reply.len(),
                    minimum: self.min_response_chars,
                },
            });
        }

        self.history.push(ChatMessage::user(content));
        self.history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Flatten context and history into a single reasoning prompt, ending
    /// with the pending user message and an open assistant turn.
    fn transcript_prompt(&self, pending: &str) -> String {
        let mut prompt = String::with_capacity(self.context.len() + pending.len() + 64);
        prompt.push_str(&self.context);
        prompt.push('\n');
        for message in &self.history {
            prompt.push('\n');
            prompt.push_str(message.role.as_str());
            prompt.push_str(": ");
            prompt.push_str(&message.content);
        }
        prompt.push_str("\nUser: ");
        prompt.push_str(pending);
        prompt.push_str("\nAssistant:");
        prompt
    }
}
