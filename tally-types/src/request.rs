//! Chat request wire types.

use serde::{Deserialize, Serialize};

/// References to documents attached to a chat turn.
///
/// The backend expects both lists on every request; absent attachments
/// are sent as empty arrays, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRefs {
    /// Ids of files uploaded for this conversation only.
    #[serde(default)]
    pub temp_file_ids: Vec<String>,
    /// Ids of files attached from a knowledge base.
    #[serde(default)]
    pub knowledge_id_files: Vec<String>,
}

/// One chat completion request.
///
/// Constructed once per send and immutable after dispatch. Serialized
/// as the camelCase JSON body of `POST /ai/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,
    /// Server-issued conversation id; absent on the first turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Model identifier; the client's default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Ids of files uploaded for this conversation only.
    #[serde(default)]
    pub temp_file_ids: Vec<String>,
    /// Ids of files attached from a knowledge base.
    #[serde(default)]
    pub knowledge_id_files: Vec<String>,
    /// Knowledge base to ground the answer in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<String>,
}

impl ChatRequest {
    /// Create a request carrying only a message, with empty document lists.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            model_id: None,
            temp_file_ids: Vec::new(),
            knowledge_id_files: Vec::new(),
            knowledge_base_id: None,
        }
    }

    /// Continue an existing conversation.
    #[must_use]
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Pin a specific model for this turn.
    #[must_use]
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Ground the answer in a knowledge base.
    #[must_use]
    pub fn knowledge_base(mut self, knowledge_base_id: impl Into<String>) -> Self {
        self.knowledge_base_id = Some(knowledge_base_id.into());
        self
    }

    /// Attach document references to this turn.
    #[must_use]
    pub fn documents(mut self, docs: DocumentRefs) -> Self {
        self.temp_file_ids = docs.temp_file_ids;
        self.knowledge_id_files = docs.knowledge_id_files;
        self
    }
}
