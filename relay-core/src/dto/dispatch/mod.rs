//! Dispatch DTOs

use serde::{Deserialize, Serialize};

use crate::domain::command::CommandBatch;
use crate::domain::token::CorrelationToken;

/// Body of a `repository_dispatch` trigger call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub event_type: String,
    pub client_payload: ClientPayload,
}

/// Opaque payload handed to the workflow as `github.event.client_payload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    pub uuid: CorrelationToken,
    pub commands: CommandBatch,
}

impl DispatchRequest {
    pub fn new(
        event_type: impl Into<String>,
        token: CorrelationToken,
        commands: CommandBatch,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            client_payload: ClientPayload {
                uuid: token,
                commands,
            },
        }
    }

    pub fn token(&self) -> CorrelationToken {
        self.client_payload.uuid
    }
}
