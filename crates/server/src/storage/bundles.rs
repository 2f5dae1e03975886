//! Bundles belong to exactly one group.

use flashqudo_api::patch::Valid;
use flashqudo_api::service::{generate_id, NewBundle, Paging};
use flashqudo_api::{db, Bundle, BundlePatch, GroupBundleResponse};
use rusqlite::{Connection, Row};

use super::{execute, query_all, query_opt, require, Db, StoreError, StoreResult};

fn bundle_by_id(conn: &Connection, bundle_id: &str) -> StoreResult<Bundle> {
    query_opt(conn, &db::bundles::get_by_id(bundle_id), |row| {
        Ok(Bundle {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            group_id: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    })?
    .ok_or(StoreError::NotFound("bundle"))
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<GroupBundleResponse> {
    Ok(GroupBundleResponse {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        group_id: row.get(3)?,
        card_count: row.get(4)?,
    })
}

impl Db {
    /// Bundle with its card count.
    pub fn bundle_summary(&self, bundle_id: &str) -> StoreResult<GroupBundleResponse> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        query_opt(&conn, &db::bundles::summary(bundle_id), summary_from_row)?
            .ok_or(StoreError::NotFound("bundle"))
    }

    pub fn list_group_bundles(
        &self,
        group_id: &str,
        paging: Paging,
    ) -> StoreResult<Vec<GroupBundleResponse>> {
        require("group_id", group_id)?;
        let conn = self.conn();
        let built = db::bundles::list_for_group(group_id, paging.limit.into(), paging.offset());
        Ok(query_all(&conn, &built, summary_from_row)?)
    }

    pub fn insert_bundle(&self, group_id: &str, bundle: &NewBundle) -> StoreResult<Bundle> {
        require("group_id", group_id)?;
        let bundle_id = generate_id();
        let conn = self.conn();
        execute(
            &conn,
            &db::bundles::insert(&bundle_id, group_id, &bundle.title, &bundle.description),
        )
        .map_err(StoreError::on_write("bundle"))?;
        bundle_by_id(&conn, &bundle_id)
    }

    pub fn update_bundle(
        &self,
        bundle_id: &str,
        patch: &Valid<BundlePatch>,
    ) -> StoreResult<Bundle> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        if execute(&conn, &db::bundles::update(bundle_id, patch))? == 0 {
            return Err(StoreError::NotFound("bundle"));
        }
        bundle_by_id(&conn, bundle_id)
    }

    /// Delete a bundle and, by cascade, its cards.
    pub fn delete_bundle(&self, bundle_id: &str) -> StoreResult<()> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        if execute(&conn, &db::bundles::delete(bundle_id))? == 0 {
            return Err(StoreError::NotFound("bundle"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_bundle, seed_card, seed_group, seed_user, test_db};

    #[test]
    fn test_summary_counts_cards() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        let group = seed_group(&db, "u1", "Spanish");
        let empty = seed_bundle(&db, &group.id, "Empty");
        let verbs = seed_bundle(&db, &group.id, "Verbs");
        seed_card(&db, &verbs.id, "ser", "to be");
        seed_card(&db, &verbs.id, "tener", "to have");

        assert_eq!(db.bundle_summary(&empty.id).unwrap().card_count, 0);
        assert_eq!(db.bundle_summary(&verbs.id).unwrap().card_count, 2);

        let listed = db.list_group_bundles(&group.id, Paging::default()).unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_insert_into_missing_group_is_dangling() {
        let db = test_db();
        let err = db
            .insert_bundle(
                "nope",
                &NewBundle {
                    title: "Lost".into(),
                    description: String::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference));
    }

    #[test]
    fn test_update_and_delete_bundle() {
        let db = test_db();
        seed_user(&db, "u1", "alice");
        let group = seed_group(&db, "u1", "Spanish");
        let bundle = seed_bundle(&db, &group.id, "Verbs");
        let card = seed_card(&db, &bundle.id, "ser", "to be");

        let patch = BundlePatch {
            title: None,
            description: Some("irregular".into()),
        }
        .validate()
        .unwrap();
        let updated = db.update_bundle(&bundle.id, &patch).unwrap();
        assert_eq!(updated.title, "Verbs");
        assert_eq!(updated.description, "irregular");

        db.delete_bundle(&bundle.id).unwrap();
        assert_eq!(db.owning_group_of_card(&card.id).unwrap(), None);
        assert!(matches!(
            db.delete_bundle(&bundle.id),
            Err(StoreError::NotFound("bundle"))
        ));
    }
}
