use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::actions::Tool;
use crate::core::app::App;
use crate::core::collaborator::{
    Collaborator, CollaboratorError, GenerationRequest, GenerationResponse,
};
use crate::core::config::data::ModelConfig;
use crate::core::persistence::MemoryStore;
use crate::core::store::ConversationStore;

pub const TEST_USER: &str = "test-user";

/// Answers from a script, in order, and remembers every request it saw.
/// An exhausted script answers with an error.
#[derive(Default)]
pub struct FakeCollaborator {
    replies: Mutex<VecDeque<Result<GenerationResponse, CollaboratorError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: GenerationResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_response(GenerationResponse::text(text))
    }

    pub fn with_error(self, message: &str) -> Self {
        self.push(Err(CollaboratorError::new(message)));
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, reply: Result<GenerationResponse, CollaboratorError>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl Collaborator for FakeCollaborator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, CollaboratorError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::new("no scripted reply")))
    }
}

/// An app attached to [`TEST_USER`] over an in-memory backend. The returned
/// backend shares its slots with the app's store.
pub fn create_test_app() -> (App, MemoryStore) {
    let backend = MemoryStore::new();
    let mut store = ConversationStore::new(Box::new(backend.clone()));
    store.attach_user(TEST_USER);
    (
        App::new(store, ModelConfig::default(), Tool::Developer),
        backend,
    )
}
