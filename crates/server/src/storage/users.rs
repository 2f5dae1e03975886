//! User profiles.

use flashqudo_api::service::NewUser;
use flashqudo_api::{db, User, UserPatch};
use flashqudo_api::patch::Valid;
use rusqlite::{Connection, Row};

use super::{execute, query_opt, require, Db, StoreError, StoreResult};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        image_url: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn user_by_id(conn: &Connection, user_id: &str) -> StoreResult<User> {
    query_opt(conn, &db::users::get_by_id(user_id), user_from_row)?
        .ok_or(StoreError::NotFound("user"))
}

impl Db {
    pub fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        require("username", username)?;
        let conn = self.conn();
        query_opt(&conn, &db::users::get_by_username(username), user_from_row)?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Resolve a username to its canonical user id.
    pub fn user_id_by_username(&self, username: &str) -> StoreResult<String> {
        require("username", username)?;
        let conn = self.conn();
        query_opt(&conn, &db::users::id_by_username(username), |row| row.get(0))?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Create the profile for an authenticated identity.
    pub fn insert_user(&self, user_id: &str, user: &NewUser) -> StoreResult<User> {
        require("user_id", user_id)?;
        let conn = self.conn();
        execute(
            &conn,
            &db::users::insert(user_id, &user.username, &user.image_url),
        )
        .map_err(StoreError::on_write("user"))?;
        user_by_id(&conn, user_id)
    }

    pub fn update_user(&self, user_id: &str, patch: &Valid<UserPatch>) -> StoreResult<User> {
        require("user_id", user_id)?;
        let conn = self.conn();
        let changed = execute(&conn, &db::users::update(user_id, patch))
            .map_err(StoreError::on_write("user"))?;
        if changed == 0 {
            return Err(StoreError::NotFound("user"));
        }
        user_by_id(&conn, user_id)
    }
}
