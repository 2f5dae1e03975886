//! User query builders.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::Users;
use super::{now_expr, Built};
use crate::patch::{UserPatch, Valid};

fn user_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.columns([
        Users::Id,
        Users::Username,
        Users::ImageUrl,
        Users::CreatedAt,
        Users::UpdatedAt,
    ])
}

pub fn get_by_id(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    user_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn get_by_username(username: &str) -> Built {
    let mut q = Query::select().to_owned();
    user_columns(&mut q);
    q.from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

/// Resolve a username to its user id.
pub fn id_by_username(username: &str) -> Built {
    Query::select()
        .column(Users::Id)
        .from(Users::Table)
        .and_where(Expr::col(Users::Username).eq(username))
        .build(SqliteQueryBuilder)
}

pub fn insert(id: &str, username: &str, image_url: &str) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([Users::Id, Users::Username, Users::ImageUrl])
        .values_panic([id.into(), username.into(), image_url.into()])
        .build(SqliteQueryBuilder)
}

/// UPDATE only the fields present in the patch.
pub fn update(user_id: &str, patch: &Valid<UserPatch>) -> Built {
    let mut q = Query::update();
    q.table(Users::Table).value(Users::UpdatedAt, now_expr());
    if let Some(image_url) = &patch.image_url {
        q.value(Users::ImageUrl, image_url.as_str());
    }
    q.and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}
