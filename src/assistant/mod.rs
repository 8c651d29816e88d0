//! Seller assistant: retrieval over listing advice, answered by a generative
//! backend when one is configured and by canned replies otherwise.

use std::sync::Arc;

use log::*;

use crate::services::generative::GenerativeTextClient;

pub mod fallback;
pub mod knowledge;
pub mod prompt;

use knowledge::KnowledgeBase;

const CONTEXT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub struct Assistant {
    knowledge: KnowledgeBase,
    generator: Option<Arc<dyn GenerativeTextClient>>,
}

impl Assistant {
    pub fn new(knowledge: KnowledgeBase, generator: Option<Arc<dyn GenerativeTextClient>>) -> Self {
        Assistant {
            knowledge,
            generator,
        }
    }

    pub async fn answer(&self, query: &str) -> Reply {
        let context = self.knowledge.retrieve(query, CONTEXT_LIMIT);
        trace!("Retrieved {} knowledge entries for assistant query.", context.len());

        if let Some(generator) = &self.generator {
            match generator.generate(&prompt::build_prompt(query, &context)).await {
                Ok(text) => {
                    return Reply {
                        text,
                        source: ReplySource::Generated,
                    }
                }
                Err(why) => warn!("Generation failed, answering from knowledge base: {}", why),
            }
        }

        Reply {
            text: fallback::reply(query, &context),
            source: ReplySource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl GenerativeTextClient for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(GenerationError::EmptyResponse)
            } else {
                Ok("Use 'squat-proof' in the title.".to_string())
            }
        }
    }

    fn assistant(fail: bool) -> (Assistant, Arc<RecordingGenerator>) {
        let generator = Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            fail,
        });
        let assistant = Assistant::new(KnowledgeBase::builtin().unwrap(), Some(generator.clone()));
        (assistant, generator)
    }

    #[tokio::test]
    async fn generated_reply_is_grounded_in_retrieval() {
        let (assistant, generator) = assistant(false);
        let reply = assistant.answer("yoga").await;
        assert_eq!(reply.source, ReplySource::Generated);
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Product: Yoga Leggings"));
    }

    #[tokio::test]
    async fn falls_back_when_generation_fails() {
        let (assistant, _) = assistant(true);
        let reply = assistant.answer("title for yoga").await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.contains("High-Waisted Yoga Leggings"));
    }

    #[tokio::test]
    async fn works_without_a_generator() {
        let assistant = Assistant::new(KnowledgeBase::builtin().unwrap(), None);
        let reply = assistant.answer("hello").await;
        assert_eq!(reply.source, ReplySource::Fallback);
    }
}
