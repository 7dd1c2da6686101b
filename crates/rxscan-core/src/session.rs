//! Per-browser session state.
//!
//! Each session holds at most one image and at most one result. A new upload
//! replaces the image but leaves the result alone until the next extraction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::types::{ExtractionResult, UploadedImage};

pub type SessionId = String;

/// One user's interactive state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current upload, shared so extraction can run without holding the store lock
    pub image: Option<Arc<UploadedImage>>,

    /// Latest extraction result
    pub result: Option<ExtractionResult>,

    /// One-shot message for the next render (e.g. a rejected upload)
    pub notice: Option<String>,

    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            image: None,
            result: None,
            notice: None,
            last_seen: Instant::now(),
        }
    }
}

impl Session {
    /// Replace the current image. Any prior result is kept.
    pub fn upload(&mut self, image: UploadedImage) {
        self.image = Some(Arc::new(image));
        self.notice = None;
    }

    /// Store a fresh result, overwriting the previous one.
    pub fn record(&mut self, result: ExtractionResult) {
        self.result = Some(result);
    }

    /// Drop the result and its timestamp. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.result.take().is_some()
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() > ttl
    }
}

/// All live sessions, keyed by the id carried in the browser cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Return `id` if it names a live session, otherwise start a new one.
    ///
    /// The second element is true when a new session was created.
    pub async fn ensure(&self, id: Option<&str>) -> (SessionId, bool) {
        let mut w = self.sessions.write().await;
        if let Some(id) = id {
            if let Some(session) = w.get_mut(id) {
                if !session.is_expired(self.ttl) {
                    session.touch();
                    return (id.to_string(), false);
                }
                w.remove(id);
                tracing::debug!(session = %id, "Session expired");
            }
        }
        let id = uuid::Uuid::new_v4().to_string();
        w.insert(id.clone(), Session::default());
        (id, true)
    }

    /// Clone of the session state, for rendering.
    pub async fn snapshot(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Run `f` against a live session. Returns `None` if it does not exist.
    pub async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut w = self.sessions.write().await;
        let session = w.get_mut(id)?;
        session.touch();
        Some(f(session))
    }

    /// Current image of a session.
    pub async fn image(&self, id: &str) -> Option<Arc<UploadedImage>> {
        self.sessions.read().await.get(id)?.image.clone()
    }

    /// Take the pending notice, so it is shown once.
    pub async fn take_notice(&self, id: &str) -> Option<String> {
        self.with_session(id, |s| s.notice.take()).await.flatten()
    }

    /// Remove sessions idle for longer than the TTL.
    pub async fn purge_expired(&self) -> usize {
        let mut w = self.sessions.write().await;
        let before = w.len();
        w.retain(|_, s| !s.is_expired(self.ttl));
        before - w.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
