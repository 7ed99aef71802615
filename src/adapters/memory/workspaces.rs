//! InMemoryWorkspaces - WorkspaceProvisioner that only keeps a table.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{ChannelId, DomainError, ErrorCode, ParticipantId};
use crate::ports::{WorkspaceProvisioner, WorkspaceRequest};

const FIRST_WORKSPACE_ID: u64 = 9_000_000;

#[derive(Debug)]
pub struct InMemoryWorkspaces {
    next_id: AtomicU64,
    open: Mutex<HashMap<ChannelId, WorkspaceRequest>>,
}

impl InMemoryWorkspaces {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(FIRST_WORKSPACE_ID),
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a workspace created elsewhere so it can be released here.
    pub fn adopt(&self, channel: ChannelId) {
        self.open.lock().unwrap_or_else(PoisonError::into_inner).insert(
            channel,
            WorkspaceRequest {
                name: channel.to_string(),
                topic: String::new(),
                members: Vec::new(),
            },
        );
    }

    pub fn is_open(&self, channel: ChannelId) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&channel)
    }

    pub fn members(&self, channel: ChannelId) -> Vec<ParticipantId> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .map(|request| request.members.clone())
            .unwrap_or_default()
    }

    pub fn name(&self, channel: ChannelId) -> Option<String> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .map(|request| request.name.clone())
    }

    pub fn open_count(&self) -> usize {
        self.open.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for InMemoryWorkspaces {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceProvisioner for InMemoryWorkspaces {
    async fn create(&self, request: WorkspaceRequest) -> Result<ChannelId, DomainError> {
        let channel = ChannelId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(channel = %channel, name = %request.name, members = request.members.len(), "workspace created");
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel, request);
        Ok(channel)
    }

    async fn release(&self, channel: ChannelId) -> Result<(), DomainError> {
        let removed = self
            .open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&channel);
        match removed {
            Some(_) => Ok(()),
            None => Err(DomainError::new(ErrorCode::WorkspaceError, "no such workspace")
                .with_detail("channel", channel.to_string())),
        }
    }
}
