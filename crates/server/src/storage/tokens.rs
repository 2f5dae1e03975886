//! Token cache: verified bearer tokens keyed by the token string.

use flashqudo_api::{db, Token};

use super::{execute, query_opt, require, Db, StoreResult};

impl Db {
    pub fn get_token(&self, token: &str) -> StoreResult<Option<Token>> {
        require("token", token)?;
        let conn = self.conn();
        let row = query_opt(&conn, &db::tokens::get(token), |row| {
            Ok(Token {
                token: row.get(0)?,
                user_id: row.get(1)?,
                expires: row.get(2)?,
            })
        })?;
        Ok(row)
    }

    /// Insert or overwrite a token row. Safe to call concurrently for the same token.
    pub fn upsert_token(&self, token: &Token) -> StoreResult<()> {
        require("token", &token.token)?;
        require("user_id", &token.user_id)?;
        let conn = self.conn();
        execute(
            &conn,
            &db::tokens::upsert(&token.token, &token.user_id, token.expires),
        )?;
        Ok(())
    }

    /// Delete the token if it is expired at `now`. Returns whether a row was
    /// removed; a row refreshed in the meantime is left alone.
    pub fn evict_expired_token(&self, token: &str, now: i64) -> StoreResult<bool> {
        require("token", token)?;
        let conn = self.conn();
        Ok(execute(&conn, &db::tokens::delete_expired(token, now))? > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::StoreError;
    use crate::test_support::test_db;
    use flashqudo_api::Token;

    fn token(value: &str, user_id: &str, expires: i64) -> Token {
        Token {
            token: value.into(),
            user_id: user_id.into(),
            expires,
        }
    }

    #[test]
    fn test_token_roundtrip_and_eviction() {
        let db = test_db();
        assert_eq!(db.get_token("t1").unwrap(), None);

        db.upsert_token(&token("t1", "u1", 100)).unwrap();
        assert_eq!(db.get_token("t1").unwrap(), Some(token("t1", "u1", 100)));

        assert!(db.evict_expired_token("t1", 100).unwrap());
        assert_eq!(db.get_token("t1").unwrap(), None);
        assert!(!db.evict_expired_token("t1", 100).unwrap());
    }

    #[test]
    fn test_eviction_spares_a_refreshed_token() {
        let db = test_db();
        db.upsert_token(&token("t1", "u1", 100)).unwrap();
        // Another request re-verified the token after this one read it stale.
        db.upsert_token(&token("t1", "u1", 5000)).unwrap();

        assert!(!db.evict_expired_token("t1", 200).unwrap());
        assert_eq!(db.get_token("t1").unwrap(), Some(token("t1", "u1", 5000)));
    }

    #[test]
    fn test_duplicate_insert_is_last_write_wins() {
        let db = test_db();
        db.upsert_token(&token("t1", "u1", 100)).unwrap();
        db.upsert_token(&token("t1", "u1", 200)).unwrap();
        assert_eq!(db.get_token("t1").unwrap().unwrap().expires, 200);

        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM tokens", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_empty_token_is_missing_parameter() {
        let db = test_db();
        assert!(matches!(
            db.get_token(""),
            Err(StoreError::MissingParameter("token"))
        ));
    }
}
