use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use image::ImageFormat;
use pixel_retouch::{AdjustmentLog, Generation, PixelBuffer, Sequence, ToneParams};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Opaque session identifier (16 hex characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random identifier
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One uploaded image and its single committed result
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Immutable upload, the input of every pass
    pub original: Arc<PixelBuffer>,
    /// Latest committed result (equals `original` until a pass commits)
    pub current: Arc<PixelBuffer>,
    pub source_format: ImageFormat,
    /// Issues sequences for passes on this session
    pub generation: Arc<Generation>,
    /// Ledger of the last committed retouch pass
    pub log: AdjustmentLog,
    /// Preset behind the last committed grade, if any
    pub preset: Option<String>,
    /// Tone parameters of the last committed grade, if any
    pub params: Option<ToneParams>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(original: PixelBuffer, source_format: ImageFormat) -> Self {
        let original = Arc::new(original);
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            current: original.clone(),
            original,
            source_format,
            generation: Arc::new(Generation::new()),
            log: AdjustmentLog::default(),
            preset: None,
            params: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while no pass has been committed since upload or reset
    pub fn is_pristine(&self) -> bool {
        Arc::ptr_eq(&self.original, &self.current)
    }
}

/// A finished pass waiting to be committed
///
/// `stacked` is true when the pass read the current result. An unstacked
/// pass read the original, so the record of the other pass kind no longer
/// describes the image and is cleared on commit.
#[derive(Debug, Clone)]
pub enum Commit {
    Retouch {
        buffer: PixelBuffer,
        log: AdjustmentLog,
        stacked: bool,
    },
    Grade {
        buffer: PixelBuffer,
        params: ToneParams,
        preset: Option<String>,
        stacked: bool,
    },
}

/// Trait for session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session
    async fn insert(&self, session: Session) -> Result<(), ApiError>;

    /// Find a session by ID
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, ApiError>;

    /// Replace the current result if `sequence` is still the latest one issued
    ///
    /// Returns [`ApiError::Stale`] when a newer request exists; the session is
    /// left unchanged in that case.
    async fn commit(
        &self,
        id: &SessionId,
        sequence: Sequence,
        commit: Commit,
    ) -> Result<Session, ApiError>;

    /// Restore current = original and clear the ledger and preset
    ///
    /// Also invalidates passes still in flight.
    async fn reset(&self, id: &SessionId) -> Result<Session, ApiError>;

    /// Drop a session; returns false if it did not exist
    ///
    /// Passes still in flight for it fail with [`ApiError::SessionNotFound`].
    async fn remove(&self, id: &SessionId) -> Result<bool, ApiError>;

    /// Number of live sessions
    async fn count(&self) -> usize;
}

/// In-memory session storage
///
/// Bounded by a session count and an idle timeout. Both are enforced when a
/// session is inserted: idle sessions are dropped first, then the least
/// recently updated ones until the new session fits.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    max_sessions: usize,
    idle_ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::with_limits(usize::MAX, None)
    }

    /// Store holding at most `max_sessions`, expiring sessions not updated
    /// within `idle_ttl`
    pub fn with_limits(max_sessions: usize, idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| now.signed_duration_since(session.updated_at) > ttl)
    }

    fn evict(&self, sessions: &mut HashMap<SessionId, Session>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        let expired = before - sessions.len();

        let mut evicted = 0;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|session| session.updated_at)
                .map(|session| session.id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            evicted += 1;
        }

        if expired + evicted > 0 {
            tracing::info!(expired, evicted, live = sessions.len(), "Evicted sessions");
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Session) -> Result<(), ApiError> {
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, Utc::now());
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, ApiError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|session| !self.is_expired(session, Utc::now()))
            .cloned())
    }

    async fn commit(
        &self,
        id: &SessionId,
        sequence: Sequence,
        commit: Commit,
    ) -> Result<Session, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or(ApiError::SessionNotFound)?;

        // Checked under the write lock so two finishing passes cannot both win
        if !session.generation.is_latest(sequence) {
            tracing::debug!(session = %id, %sequence, latest = %session.generation.latest(), "Dropping stale result");
            return Err(ApiError::Stale(sequence));
        }

        match commit {
            Commit::Retouch {
                buffer,
                log,
                stacked,
            } => {
                session.current = Arc::new(buffer);
                session.log = log;
                if !stacked {
                    session.params = None;
                    session.preset = None;
                }
            }
            Commit::Grade {
                buffer,
                params,
                preset,
                stacked,
            } => {
                session.current = Arc::new(buffer);
                session.params = Some(params);
                session.preset = preset;
                if !stacked {
                    session.log = AdjustmentLog::default();
                }
            }
        }
        session.updated_at = Utc::now();

        Ok(session.clone())
    }

    async fn reset(&self, id: &SessionId) -> Result<Session, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or(ApiError::SessionNotFound)?;

        session.generation.next();
        session.current = session.original.clone();
        session.log = AdjustmentLog::default();
        session.preset = None;
        session.params = None;
        session.updated_at = Utc::now();

        Ok(session.clone())
    }

    async fn remove(&self, id: &SessionId) -> Result<bool, ApiError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(id).is_some())
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
