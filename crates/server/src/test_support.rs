//! Fixtures shared by the unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use flashqudo_api::service::{NewBundle, NewCard, NewUser};
use flashqudo_api::{Bundle, Card, Group};

use crate::auth::identity::{IdentityVerifier, VerifiedIdentity, VerifyError};
use crate::storage::Db;

/// A fresh on-disk database in a temp directory that outlives the test.
pub fn test_db() -> Db {
    let dir = tempfile::tempdir().unwrap().keep();
    Db::open_path(&dir.join("test.db")).unwrap()
}

pub fn seed_user(db: &Db, user_id: &str, username: &str) -> flashqudo_api::User {
    db.insert_user(
        user_id,
        &NewUser {
            username: username.into(),
            image_url: "Default".into(),
        },
    )
    .unwrap()
}

pub fn seed_group(db: &Db, creator_id: &str, name: &str) -> Group {
    db.create_group(name, creator_id).unwrap()
}

pub fn seed_member(db: &Db, group_id: &str, user_id: &str, is_admin: bool) {
    db.add_member(group_id, user_id, is_admin).unwrap();
}

pub fn seed_bundle(db: &Db, group_id: &str, title: &str) -> Bundle {
    db.insert_bundle(
        group_id,
        &NewBundle {
            title: title.into(),
            description: String::new(),
        },
    )
    .unwrap()
}

pub fn seed_card(db: &Db, bundle_id: &str, question: &str, answer: &str) -> Card {
    db.insert_card(
        bundle_id,
        &NewCard {
            question: question.into(),
            answer: answer.into(),
        },
    )
    .unwrap()
}

/// Identity verifier double. Accepts only the tokens it was told about and
/// counts every call.
#[derive(Default)]
pub struct StubVerifier {
    accepted: Mutex<Vec<(String, VerifiedIdentity)>>,
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept(&self, token: &str, user_id: &str, expires_at: i64) {
        self.accepted.lock().unwrap().push((
            token.to_string(),
            VerifiedIdentity {
                user_id: user_id.to_string(),
                expires_at,
            },
        ));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accepted
            .lock()
            .unwrap()
            .iter()
            .find(|(token, _)| token == raw_token)
            .map(|(_, identity)| identity.clone())
            .ok_or_else(|| VerifyError::Rejected("unknown token".into()))
    }
}

pub fn in_an_hour() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}
