//! Ownership resolution: walk Card → Bundle → Group and report the caller's
//! standing there in one query. A dangling id yields no row.

use flashqudo_api::db;

use super::{query_one, query_opt, require, Db, StoreResult};

impl Db {
    pub fn can_see_bundle(&self, bundle_id: &str, user_id: &str) -> StoreResult<bool> {
        require("bundle_id", bundle_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        Ok(query_one(
            &conn,
            &db::authz::can_see_bundle(bundle_id, user_id),
            |row| row.get(0),
        )?)
    }

    /// Admin flag of the user in the bundle's group; `None` if the bundle
    /// does not exist or the user is not a member.
    pub fn bundle_admin_flag(&self, bundle_id: &str, user_id: &str) -> StoreResult<Option<bool>> {
        require("bundle_id", bundle_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        Ok(query_opt(
            &conn,
            &db::authz::bundle_admin_flag(bundle_id, user_id),
            |row| row.get(0),
        )?)
    }

    pub fn card_admin_flag(&self, card_id: &str, user_id: &str) -> StoreResult<Option<bool>> {
        require("card_id", card_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        Ok(query_opt(
            &conn,
            &db::authz::card_admin_flag(card_id, user_id),
            |row| row.get(0),
        )?)
    }

    pub fn owning_group_of_bundle(&self, bundle_id: &str) -> StoreResult<Option<String>> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        Ok(query_opt(&conn, &db::authz::bundle_owner(bundle_id), |row| row.get(0))?)
    }

    pub fn owning_group_of_card(&self, card_id: &str) -> StoreResult<Option<String>> {
        require("card_id", card_id)?;
        let conn = self.conn();
        Ok(query_opt(&conn, &db::authz::card_owner(card_id), |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_bundle, seed_card, seed_group, seed_member, seed_user, test_db};

    #[test]
    fn test_ownership_chain_resolves() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        seed_user(&db, "u2", "bob");
        seed_user(&db, "u3", "carol");
        let group = seed_group(&db, "u1", "Spanish");
        seed_member(&db, &group.id, "u2", false);
        let bundle = seed_bundle(&db, &group.id, "Verbs");
        let card = seed_card(&db, &bundle.id, "ser", "to be");

        assert_eq!(
            db.owning_group_of_bundle(&bundle.id).unwrap().as_deref(),
            Some(group.id.as_str())
        );
        assert_eq!(
            db.owning_group_of_card(&card.id).unwrap().as_deref(),
            Some(group.id.as_str())
        );

        assert!(db.can_see_bundle(&bundle.id, "u2").unwrap());
        assert!(!db.can_see_bundle(&bundle.id, "u3").unwrap());

        assert_eq!(db.bundle_admin_flag(&bundle.id, "u1").unwrap(), Some(true));
        assert_eq!(db.bundle_admin_flag(&bundle.id, "u2").unwrap(), Some(false));
        assert_eq!(db.bundle_admin_flag(&bundle.id, "u3").unwrap(), None);
        assert_eq!(db.card_admin_flag(&card.id, "u1").unwrap(), Some(true));
        assert_eq!(db.card_admin_flag(&card.id, "u2").unwrap(), Some(false));
    }

    #[test]
    fn test_dangling_ids_resolve_to_nothing() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        assert_eq!(db.owning_group_of_bundle("missing").unwrap(), None);
        assert_eq!(db.owning_group_of_card("missing").unwrap(), None);
        assert!(!db.can_see_bundle("missing", "u1").unwrap());
        assert_eq!(db.card_admin_flag("missing", "u1").unwrap(), None);
    }
}
