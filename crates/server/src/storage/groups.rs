//! Groups. Creating a group and seating its first admin is one transaction.

use flashqudo_api::patch::Valid;
use flashqudo_api::service::generate_id;
use flashqudo_api::{db, Group, GroupPatch};
use rusqlite::{Connection, Row};

use super::{execute, query_one, query_opt, require, Db, StoreError, StoreResult};

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn group_by_id(conn: &Connection, group_id: &str) -> StoreResult<Group> {
    query_opt(conn, &db::groups::get_by_id(group_id), group_from_row)?
        .ok_or(StoreError::NotFound("group"))
}

impl Db {
    pub fn get_group(&self, group_id: &str) -> StoreResult<Group> {
        require("group_id", group_id)?;
        group_by_id(&self.conn(), group_id)
    }

    pub fn group_exists(&self, group_id: &str) -> StoreResult<bool> {
        require("group_id", group_id)?;
        let conn = self.conn();
        Ok(query_one(&conn, &db::groups::exists(group_id), |row| row.get(0))?)
    }

    /// Create a group with `creator_id` as its first admin member.
    pub fn create_group(&self, name: &str, creator_id: &str) -> StoreResult<Group> {
        require("name", name)?;
        require("user_id", creator_id)?;
        let group_id = generate_id();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        execute(&tx, &db::groups::insert(&group_id, name)).map_err(StoreError::on_write("group"))?;
        execute(&tx, &db::members::insert(&group_id, creator_id, true))
            .map_err(StoreError::on_write("member"))?;
        let group = group_by_id(&tx, &group_id)?;
        tx.commit()?;
        Ok(group)
    }

    pub fn update_group(&self, group_id: &str, patch: &Valid<GroupPatch>) -> StoreResult<Group> {
        require("group_id", group_id)?;
        let conn = self.conn();
        if execute(&conn, &db::groups::update(group_id, patch))? == 0 {
            return Err(StoreError::NotFound("group"));
        }
        group_by_id(&conn, group_id)
    }

    /// Delete a group unless someone besides the caller still belongs to it.
    /// Memberships, bundles and cards are removed by cascade.
    pub fn delete_group(&self, group_id: &str) -> StoreResult<()> {
        require("group_id", group_id)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let members: i64 = query_one(&tx, &db::members::count(group_id), |row| row.get(0))?;
        if members > 1 {
            return Err(StoreError::MembersExist);
        }
        if execute(&tx, &db::groups::delete(group_id))? == 0 {
            return Err(StoreError::NotFound("group"));
        }
        tx.commit()?;
        Ok(())
    }
}
