//! Token cache query builders.

use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use super::tables::Tokens;
use super::Built;

/// SELECT a cached token row (token, user_id, expires).
pub fn get(token: &str) -> Built {
    Query::select()
        .columns([Tokens::Token, Tokens::UserId, Tokens::Expires])
        .from(Tokens::Table)
        .and_where(Expr::col(Tokens::Token).eq(token))
        .build(SqliteQueryBuilder)
}

/// INSERT a verified token, overwriting any row with the same token string.
///
/// Concurrent cold verifications of one token race on this statement; the
/// upsert makes the last writer win instead of failing on the primary key.
pub fn upsert(token: &str, user_id: &str, expires: i64) -> Built {
    Query::insert()
        .into_table(Tokens::Table)
        .columns([Tokens::Token, Tokens::UserId, Tokens::Expires])
        .values_panic([token.into(), user_id.into(), expires.into()])
        .on_conflict(
            OnConflict::column(Tokens::Token)
                .update_columns([Tokens::UserId, Tokens::Expires])
                .to_owned(),
        )
        .build(SqliteQueryBuilder)
}

/// DELETE the token row only if it is still expired at `now`. A row
/// refreshed by a concurrent verification survives.
pub fn delete_expired(token: &str, now: i64) -> Built {
    Query::delete()
        .from_table(Tokens::Table)
        .and_where(Expr::col(Tokens::Token).eq(token))
        .and_where(Expr::col(Tokens::Expires).lte(now))
        .build(SqliteQueryBuilder)
}
