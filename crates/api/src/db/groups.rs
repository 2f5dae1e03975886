//! Group query builders.

use sea_query::{Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::tables::Groups;
use super::Built;
use crate::patch::{GroupPatch, Valid};

pub fn get_by_id(group_id: &str) -> Built {
    Query::select()
        .columns([Groups::Id, Groups::Name, Groups::CreatedAt])
        .from(Groups::Table)
        .and_where(Expr::col(Groups::Id).eq(group_id))
        .build(SqliteQueryBuilder)
}

pub fn exists(group_id: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Groups::Table)
        .and_where(Expr::col(Groups::Id).eq(group_id))
        .build(SqliteQueryBuilder)
}

pub fn insert(id: &str, name: &str) -> Built {
    Query::insert()
        .into_table(Groups::Table)
        .columns([Groups::Id, Groups::Name])
        .values_panic([id.into(), name.into()])
        .build(SqliteQueryBuilder)
}

pub fn update(group_id: &str, patch: &Valid<GroupPatch>) -> Built {
    let mut q = Query::update();
    q.table(Groups::Table);
    if let Some(name) = &patch.name {
        q.value(Groups::Name, name.as_str());
    }
    q.and_where(Expr::col(Groups::Id).eq(group_id))
        .build(SqliteQueryBuilder)
}

/// DELETE a group. Members, bundles and cards go with it via FK cascade.
pub fn delete(group_id: &str) -> Built {
    Query::delete()
        .from_table(Groups::Table)
        .and_where(Expr::col(Groups::Id).eq(group_id))
        .build(SqliteQueryBuilder)
}
