// src/session/mod.rs

use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::model::CanonicalRecipe;
use crate::protocol::GenerateRequest;
use crate::storage::TtlMap;

/// Logical state of a clarification session after its last planner round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Entered right after the first extraction, before any round outcome.
    Created,
    /// The last plan carried open questions.
    AwaitingAnswers,
    /// The last plan carried none. End-of-round marker.
    Resolved,
}

/// Per-generation-request state carried across clarification rounds.
/// The canonical recipe is extracted once and never replaced; answers only
/// accumulate.
#[derive(Clone, Debug)]
pub struct ClarificationSession {
    pub request: GenerateRequest,
    pub robot_model: String,
    pub canonical: CanonicalRecipe,
    pub answers: Map<String, Value>,
    pub last_questions: Vec<Value>,
    pub phase: SessionPhase,
}

impl ClarificationSession {
    pub fn new(request: GenerateRequest, canonical: CanonicalRecipe) -> Self {
        let robot_model = request.robot_model.clone();
        Self {
            request,
            robot_model,
            canonical,
            answers: Map::new(),
            last_questions: Vec::new(),
            phase: SessionPhase::Created,
        }
    }

    /// Key-wise overwrite. Keys not mentioned keep their previous value;
    /// nothing is ever deleted.
    pub fn merge_answers(&mut self, new_answers: &Map<String, Value>) {
        for (key, value) in new_answers {
            self.answers.insert(key.clone(), value.clone());
        }
    }

    /// Record one round's question set; phase follows its emptiness.
    pub fn note_round(&mut self, questions: &[Value]) {
        self.last_questions = questions.to_vec();
        self.phase = if questions.is_empty() {
            SessionPhase::Resolved
        } else {
            SessionPhase::AwaitingAnswers
        };
    }
}

/// Shared session table: bounded, TTL-evicting, and cleaned up when a round
/// resolves. Same discipline as the response cache.
///
/// Concurrent continuations against the same id are not ordered here; a
/// caller that allows them must serialize per session.
pub struct SessionStore {
    inner: Mutex<TtlMap<ClarificationSession>>,
}

impl SessionStore {
    pub fn new(ttl_s: u64, maxsize: usize) -> Self {
        Self {
            inner: Mutex::new(TtlMap::new(Duration::from_secs(ttl_s), maxsize)),
        }
    }

    pub fn insert(&self, session_id: &str, session: ClarificationSession) {
        self.inner
            .lock()
            .unwrap()
            .insert(session_id.to_string(), session);
    }

    pub fn snapshot(&self, session_id: &str) -> Option<ClarificationSession> {
        self.inner.lock().unwrap().get(session_id).cloned()
    }

    /// Merges `new_answers` into the stored session and returns the updated
    /// snapshot, or `None` for an unknown id.
    pub fn merge_answers(
        &self,
        session_id: &str,
        new_answers: &Map<String, Value>,
    ) -> Option<ClarificationSession> {
        let mut guard = self.inner.lock().unwrap();
        let session = guard.get_mut(session_id)?;
        session.merge_answers(new_answers);
        Some(session.clone())
    }

    /// Records a round outcome. A resolved round removes the session;
    /// an awaiting round keeps it with the fresh question set.
    pub fn note_round(&self, session_id: &str, questions: &[Value]) {
        let mut guard = self.inner.lock().unwrap();
        if questions.is_empty() {
            guard.remove(session_id);
            return;
        }
        if let Some(session) = guard.get_mut(session_id) {
            session.note_round(questions);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerateRequest {
        serde_json::from_value(json!({"query": "борщ", "robot_model": "chef1"})).unwrap()
    }

    fn canonical() -> CanonicalRecipe {
        serde_json::from_value(json!({"title": "Борщ"})).unwrap()
    }

    fn store() -> SessionStore {
        SessionStore::new(3600, 16)
    }

    #[test]
    fn answers_overwrite_and_retain() {
        let s = store();
        s.insert("s1", ClarificationSession::new(request(), canonical()));

        let mut first = Map::new();
        first.insert("k".into(), json!("a"));
        first.insert("bowl".into(), json!("2l"));
        s.merge_answers("s1", &first).unwrap();

        let mut second = Map::new();
        second.insert("k".into(), json!("b"));
        let merged = s.merge_answers("s1", &second).unwrap();

        assert_eq!(merged.answers["k"], json!("b"));
        // Unmentioned key keeps its prior value.
        assert_eq!(merged.answers["bowl"], json!("2l"));
        assert!(s.merge_answers("missing", &second).is_none());
    }

    #[test]
    fn phase_follows_question_emptiness() {
        let mut session = ClarificationSession::new(request(), canonical());
        assert_eq!(session.phase, SessionPhase::Created);

        session.note_round(&[json!({"key": "q1"})]);
        assert_eq!(session.phase, SessionPhase::AwaitingAnswers);
        assert_eq!(session.last_questions.len(), 1);

        session.note_round(&[]);
        assert_eq!(session.phase, SessionPhase::Resolved);
        assert!(session.last_questions.is_empty());
    }

    #[test]
    fn resolved_round_removes_session() {
        let s = store();
        s.insert("s1", ClarificationSession::new(request(), canonical()));

        s.note_round("s1", &[json!({"key": "q1"})]);
        assert_eq!(s.snapshot("s1").unwrap().phase, SessionPhase::AwaitingAnswers);

        s.note_round("s1", &[]);
        assert!(s.snapshot("s1").is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn sessions_expire_and_stay_bounded() {
        let short = SessionStore::new(0, 4);
        short.insert("s1", ClarificationSession::new(request(), canonical()));
        std::thread::sleep(Duration::from_millis(10));
        assert!(short.snapshot("s1").is_none());

        let bounded = SessionStore::new(3600, 2);
        for id in ["a", "b", "c"] {
            bounded.insert(id, ClarificationSession::new(request(), canonical()));
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(bounded.len(), 2);
        assert!(bounded.snapshot("a").is_none());
        assert!(bounded.snapshot("c").is_some());
    }
}
