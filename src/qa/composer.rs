use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::llm::Generator;
use crate::qa::retriever::RetrievedContext;

const INSTRUCTIONS: &str = "You are an intelligent assistant used to retrieve context from vector db and answer users question. Use only the context given to answer.";

/// Render the answer prompt. Chunks are joined with a blank line.
pub fn render_prompt(question: &str, context: &RetrievedContext) -> String {
    let joined = context.texts().collect::<Vec<_>>().join("\n\n");
    format!("{INSTRUCTIONS}\n\nContext: {joined}\n\nQuestion: {question}\n\nAnswer:")
}

pub struct AnswerComposer {
    generator: Arc<dyn Generator>,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Ask the model to answer `question` from `context`; the reply is returned as-is.
    pub async fn answer(&self, question: &str, context: &RetrievedContext) -> Result<String> {
        let prompt = render_prompt(question, context);
        let answer = self.generator.generate(&prompt).await?;
        info!(
            generation = context.generation,
            context_chunks = context.chunks.len(),
            answer_len = answer.len(),
            "answer generated"
        );
        Ok(answer)
    }
}
