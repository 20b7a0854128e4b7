//! Per-user sessions and the registry that hands them out.

use crate::assistant::Assistant;
use crate::error::AgendaCoreError;
use agenda_rs_protocol::{Turn, TurnRole, UserId};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Conversation state for one user within this process.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: UserId,
    transcript: Vec<Turn>,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            transcript: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Ordered transcript of completed turns.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Drop the transcript. Memory is unaffected.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Append one completed turn, then drop the oldest turns so that at most
    /// `window` user and assistant turns remain.
    ///
    /// Tool turns are kept only while the exchange they belong to is.
    pub(crate) fn record(
        &mut self,
        user: Turn,
        tools: Vec<Turn>,
        assistant: Turn,
        window: usize,
    ) {
        self.transcript.push(user);
        self.transcript.extend(tools);
        self.transcript.push(assistant);
        self.trim_to(window);
    }

    fn trim_to(&mut self, window: usize) {
        let mut spoken = 0;
        let mut cut = 0;
        for (index, turn) in self.transcript.iter().enumerate().rev() {
            if turn.role == TurnRole::Tool {
                continue;
            }
            if spoken == window {
                cut = index + 1;
                break;
            }
            spoken += 1;
        }
        if cut > 0 {
            debug!(
                "trimmed transcript (user_id={}, dropped={})",
                self.user_id, cut
            );
            self.transcript.drain(..cut);
        }
    }
}

/// Lazily creates one session per user id.
///
/// Each session sits behind its own async mutex so a user's turns run one at
/// a time while different users proceed independently.
#[derive(Clone)]
pub struct SessionRegistry {
    assistant: Arc<Assistant>,
    sessions: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<Session>>>>>,
}

impl SessionRegistry {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn assistant(&self) -> &Arc<Assistant> {
        &self.assistant
    }

    /// Session for `user_id`, created on first use.
    pub fn session(&self, user_id: &str) -> Result<Arc<AsyncMutex<Session>>, AgendaCoreError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AgendaCoreError::InvalidInput(
                "user id cannot be empty".to_string(),
            ));
        }
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(user_id) {
            return Ok(session.clone());
        }
        info!("created session (user_id={})", user_id);
        let session = Arc::new(AsyncMutex::new(Session::new(user_id)));
        sessions.insert(user_id.to_string(), session.clone());
        Ok(session)
    }

    /// Run one turn in the user's session.
    pub async fn respond(&self, user_id: &str, utterance: &str) -> Result<String, AgendaCoreError> {
        let session = self.session(user_id)?;
        let mut session = session.lock().await;
        debug!("session locked (user_id={})", session.user_id());
        self.assistant.respond(&mut session, utterance).await
    }

    /// Forget a user's session. Returns whether one existed.
    pub fn end_session(&self, user_id: &str) -> bool {
        let removed = self.sessions.lock().remove(user_id.trim()).is_some();
        if removed {
            info!("ended session (user_id={})", user_id.trim());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
