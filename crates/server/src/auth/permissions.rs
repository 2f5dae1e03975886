//! Permission predicates. Every check reads storage directly and fails
//! closed: an error of any kind is a deny.

use tracing::Span;

use crate::storage::{Db, StoreError, StoreResult};

#[derive(Clone)]
pub struct PermissionEvaluator {
    db: Db,
    log: Span,
}

impl PermissionEvaluator {
    pub fn new(db: Db, log: Span) -> Self {
        Self { db, log }
    }

    fn decide(
        &self,
        check: &'static str,
        subject: &str,
        user_id: &str,
        result: StoreResult<bool>,
    ) -> bool {
        match result {
            Ok(true) => {
                tracing::debug!(parent: &self.log, check, subject, user_id, "SUCCESS");
                true
            }
            Ok(false) => {
                tracing::debug!(parent: &self.log, check, subject, user_id, "FAIL");
                false
            }
            Err(StoreError::NotFound(what)) => {
                tracing::debug!(
                    parent: &self.log,
                    check, subject, user_id,
                    "FAIL: {what} not found"
                );
                false
            }
            Err(StoreError::MissingParameter(name)) => {
                tracing::warn!(
                    parent: &self.log,
                    check, subject, user_id,
                    "FAIL: missing parameter {name}"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    parent: &self.log,
                    check, subject, user_id,
                    "FAIL: storage error: {e}"
                );
                false
            }
        }
    }

    pub fn is_group_member(&self, group_id: &str, user_id: &str) -> bool {
        let result = self.db.is_member(group_id, user_id);
        self.decide("is_group_member", group_id, user_id, result)
    }

    /// Does `claimed_username` belong to `user_id`?
    pub fn is_same_user(&self, user_id: &str, claimed_username: &str) -> bool {
        let result = self
            .db
            .user_id_by_username(claimed_username)
            .map(|owner| owner == user_id);
        self.decide("is_same_user", claimed_username, user_id, result)
    }

    pub fn can_see_bundle(&self, bundle_id: &str, user_id: &str) -> bool {
        let result = self.db.can_see_bundle(bundle_id, user_id);
        self.decide("can_see_bundle", bundle_id, user_id, result)
    }

    /// Admin of the bundle's group. A missing bundle and a non-admin caller
    /// look the same.
    pub fn can_edit_bundle(&self, bundle_id: &str, user_id: &str) -> bool {
        let result = self
            .db
            .bundle_admin_flag(bundle_id, user_id)
            .map(|flag| flag.unwrap_or(false));
        self.decide("can_edit_bundle", bundle_id, user_id, result)
    }

    pub fn can_edit_card(&self, card_id: &str, user_id: &str) -> bool {
        let result = self
            .db
            .card_admin_flag(card_id, user_id)
            .map(|flag| flag.unwrap_or(false));
        self.decide("can_edit_card", card_id, user_id, result)
    }

    /// Admin flag of the membership. A group that exists but has no members
    /// at all grants admin to anyone.
    pub fn is_group_admin(&self, group_id: &str, user_id: &str) -> bool {
        let result = self.db.member_admin_flag(group_id, user_id).and_then(|flag| {
            if flag == Some(true) {
                return Ok(true);
            }
            if self.db.member_count(group_id)? > 0 {
                return Ok(false);
            }
            let orphaned = self.db.group_exists(group_id)?;
            if orphaned {
                tracing::warn!(
                    parent: &self.log,
                    group_id, user_id,
                    "granting admin on a group without members"
                );
            }
            Ok(orphaned)
        });
        self.decide("is_group_admin", group_id, user_id, result)
    }
}
