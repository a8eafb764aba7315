//! In-memory guest session store.
//!
//! Sessions are keyed by an opaque id and expire once `now - last_activity`
//! exceeds the TTL. Expired sessions are swept whenever a session is
//! fetched-or-created and on demand via [`GuestSessionStore::sweep_expired`].
//! Reads treat an expired session as absent even before it is swept.
//!
//! Every method takes `now` explicitly so expiry is testable without sleeping.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use uniassist_types::chat::ChatMessage;
use uniassist_types::guest::{CleanupStats, GuestSession};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

pub struct GuestSessionStore {
    sessions: DashMap<String, GuestSession>,
    ttl: Duration,
}

impl GuestSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a fresh id of the form `guest_<epoch-ms>_<9 base36 chars>`.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("guest_{}_{suffix}", now.timestamp_millis())
    }

    fn is_expired(&self, session: &GuestSession, now: DateTime<Utc>) -> bool {
        now - session.last_activity > self.ttl
    }

    /// Append messages to a session, creating it if it does not exist (or has
    /// expired), and mark it active. Returns the session's message count.
    pub fn append(
        &self,
        id: &str,
        messages: impl IntoIterator<Item = ChatMessage>,
        now: DateTime<Utc>,
    ) -> usize {
        self.sweep_expired(now);
        let mut session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| GuestSession::new(id, now));
        session.last_activity = now;
        session.messages.extend(messages);
        session.messages.len()
    }

    /// Snapshot of a live session.
    pub fn get(&self, id: &str, now: DateTime<Utc>) -> Option<GuestSession> {
        let session = self.sessions.get(id)?.clone();
        if self.is_expired(&session, now) {
            self.sessions
                .remove_if(id, |_, s| self.is_expired(s, now));
            return None;
        }
        Some(session)
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sweep_expired(&self, now: DateTime<Utc>) -> CleanupStats {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !self.is_expired(s, now));
        let after = self.sessions.len();
        CleanupStats {
            before,
            after,
            cleaned: before.saturating_sub(after),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uniassist_types::chat::MessageRole;

    fn store() -> GuestSessionStore {
        GuestSessionStore::new(Duration::hours(1))
    }

    #[test]
    fn test_generate_id_shape() {
        let now = Utc::now();
        let id = GuestSessionStore::generate_id(now);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "guest");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_append_creates_and_accumulates() {
        let store = store();
        let now = Utc::now();
        assert_eq!(
            store.append("s1", [ChatMessage::text(MessageRole::User, "hi")], now),
            1
        );
        assert_eq!(
            store.append("s1", [ChatMessage::text(MessageRole::Assistant, "hey")], now),
            2
        );
        let session = store.get("s1", now).unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.created_at, now);
    }

    #[test]
    fn test_expired_session_reads_as_absent() {
        let store = store();
        let start = Utc::now();
        store.append("s1", [ChatMessage::text(MessageRole::User, "hi")], start);

        let within = start + Duration::minutes(59);
        assert!(store.get("s1", within).is_some());

        let past = start + Duration::minutes(61);
        assert!(store.get("s1", past).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_activity_extends_lifetime() {
        let store = store();
        let start = Utc::now();
        store.append("s1", [], start);
        store.append("s1", [], start + Duration::minutes(50));
        assert!(store.get("s1", start + Duration::minutes(100)).is_some());
    }

    #[test]
    fn test_expired_session_is_recreated_empty() {
        let store = store();
        let start = Utc::now();
        store.append("s1", [ChatMessage::text(MessageRole::User, "old")], start);
        let later = start + Duration::hours(2);
        assert_eq!(
            store.append("s1", [ChatMessage::text(MessageRole::User, "new")], later),
            1
        );
        assert_eq!(store.get("s1", later).unwrap().created_at, later);
    }

    #[test]
    fn test_fetch_or_create_sweeps_others() {
        let store = store();
        let start = Utc::now();
        store.append("old", [], start);
        store.append("new", [], start + Duration::hours(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_stats() {
        let store = store();
        let start = Utc::now();
        store.append("a", [], start);
        store.append("b", [], start);
        store.append("c", [], start + Duration::minutes(30));

        let stats = store.sweep_expired(start + Duration::minutes(75));
        assert_eq!(
            stats,
            CleanupStats {
                before: 3,
                after: 1,
                cleaned: 2
            }
        );
    }

    #[test]
    fn test_remove() {
        let store = store();
        store.append("s1", [], Utc::now());
        assert!(store.remove("s1"));
        assert!(!store.remove("s1"));
    }
}
