//! Group membership.

use flashqudo_api::patch::Valid;
use flashqudo_api::service::Paging;
use flashqudo_api::{db, GroupMemberResponse, Member, MemberPatch, UserGroupResponse};
use rusqlite::Connection;

use super::{execute, query_all, query_one, query_opt, require, Db, StoreError, StoreResult};

fn member_by_pair(conn: &Connection, group_id: &str, user_id: &str) -> StoreResult<Member> {
    query_opt(conn, &db::members::get(group_id, user_id), |row| {
        Ok(Member {
            group_id: row.get(0)?,
            user_id: row.get(1)?,
            is_admin: row.get(2)?,
            member_since: row.get(3)?,
        })
    })?
    .ok_or(StoreError::NotFound("member"))
}

impl Db {
    pub fn is_member(&self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        Ok(query_one(
            &conn,
            &db::members::exists(group_id, user_id),
            |row| row.get(0),
        )?)
    }

    /// `None` when the user is not a member of the group.
    pub fn member_admin_flag(&self, group_id: &str, user_id: &str) -> StoreResult<Option<bool>> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        Ok(query_opt(
            &conn,
            &db::members::admin_flag(group_id, user_id),
            |row| row.get(0),
        )?)
    }

    pub fn member_count(&self, group_id: &str) -> StoreResult<i64> {
        require("group_id", group_id)?;
        let conn = self.conn();
        Ok(query_one(&conn, &db::members::count(group_id), |row| row.get(0))?)
    }

    pub fn get_member(&self, group_id: &str, user_id: &str) -> StoreResult<Member> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        member_by_pair(&self.conn(), group_id, user_id)
    }

    pub fn add_member(&self, group_id: &str, user_id: &str, is_admin: bool) -> StoreResult<Member> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        execute(&conn, &db::members::insert(group_id, user_id, is_admin))
            .map_err(StoreError::on_write("member"))?;
        member_by_pair(&conn, group_id, user_id)
    }

    pub fn update_member(
        &self,
        group_id: &str,
        user_id: &str,
        patch: &Valid<MemberPatch>,
    ) -> StoreResult<Member> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        if execute(&conn, &db::members::update(group_id, user_id, patch))? == 0 {
            return Err(StoreError::NotFound("member"));
        }
        member_by_pair(&conn, group_id, user_id)
    }

    pub fn remove_member(&self, group_id: &str, user_id: &str) -> StoreResult<()> {
        require("group_id", group_id)?;
        require("user_id", user_id)?;
        let conn = self.conn();
        if execute(&conn, &db::members::delete(group_id, user_id))? == 0 {
            return Err(StoreError::NotFound("member"));
        }
        Ok(())
    }

    pub fn list_members(
        &self,
        group_id: &str,
        paging: Paging,
    ) -> StoreResult<Vec<GroupMemberResponse>> {
        require("group_id", group_id)?;
        let conn = self.conn();
        let built = db::members::list_for_group(group_id, paging.limit.into(), paging.offset());
        Ok(query_all(&conn, &built, |row| {
            Ok(GroupMemberResponse {
                id: row.get(0)?,
                username: row.get(1)?,
                image_url: row.get(2)?,
                is_admin: row.get(3)?,
                member_since: row.get(4)?,
            })
        })?)
    }

    pub fn list_user_groups(
        &self,
        user_id: &str,
        paging: Paging,
    ) -> StoreResult<Vec<UserGroupResponse>> {
        require("user_id", user_id)?;
        let conn = self.conn();
        let built = db::members::list_for_user(user_id, paging.limit.into(), paging.offset());
        Ok(query_all(&conn, &built, |row| {
            Ok(UserGroupResponse {
                id: row.get(0)?,
                name: row.get(1)?,
                is_admin: row.get(2)?,
                member_since: row.get(3)?,
            })
        })?)
    }
}
