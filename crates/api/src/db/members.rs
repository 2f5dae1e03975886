//! Membership query builders.

use sea_query::{Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::tables::{Groups, Members, Users};
use super::Built;
use crate::patch::{MemberPatch, Valid};

fn pair<'a>(
    q: &'a mut sea_query::SelectStatement,
    group_id: &str,
    user_id: &str,
) -> &'a mut sea_query::SelectStatement {
    q.and_where(Expr::col((Members::Table, Members::GroupId)).eq(group_id))
        .and_where(Expr::col((Members::Table, Members::UserId)).eq(user_id))
}

/// SELECT the full membership row for a (group, user) pair.
pub fn get(group_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.columns([
        Members::GroupId,
        Members::UserId,
        Members::IsAdmin,
        Members::MemberSince,
    ])
    .from(Members::Table);
    pair(&mut q, group_id, user_id).build(SqliteQueryBuilder)
}

/// Does a membership row exist for the pair?
pub fn exists(group_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Members::Table);
    pair(&mut q, group_id, user_id).build(SqliteQueryBuilder)
}

/// Project the admin flag of the pair's membership row (no row if not a member).
pub fn admin_flag(group_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.column((Members::Table, Members::IsAdmin))
        .from(Members::Table);
    pair(&mut q, group_id, user_id).build(SqliteQueryBuilder)
}

/// Number of members in a group.
pub fn count(group_id: &str) -> Built {
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from(Members::Table)
        .and_where(Expr::col(Members::GroupId).eq(group_id))
        .build(SqliteQueryBuilder)
}

pub fn insert(group_id: &str, user_id: &str, is_admin: bool) -> Built {
    Query::insert()
        .into_table(Members::Table)
        .columns([Members::GroupId, Members::UserId, Members::IsAdmin])
        .values_panic([group_id.into(), user_id.into(), is_admin.into()])
        .build(SqliteQueryBuilder)
}

pub fn update(group_id: &str, user_id: &str, patch: &Valid<MemberPatch>) -> Built {
    let mut q = Query::update();
    q.table(Members::Table);
    if let Some(is_admin) = patch.is_admin {
        q.value(Members::IsAdmin, is_admin);
    }
    q.and_where(Expr::col(Members::GroupId).eq(group_id))
        .and_where(Expr::col(Members::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn delete(group_id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(Members::Table)
        .and_where(Expr::col(Members::GroupId).eq(group_id))
        .and_where(Expr::col(Members::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Members of a group joined with their profiles:
/// (id, username, image_url, is_admin, member_since).
pub fn list_for_group(group_id: &str, limit: u64, offset: u64) -> Built {
    Query::select()
        .column((Users::Table, Users::Id))
        .column((Users::Table, Users::Username))
        .column((Users::Table, Users::ImageUrl))
        .column((Members::Table, Members::IsAdmin))
        .column((Members::Table, Members::MemberSince))
        .from(Users::Table)
        .inner_join(
            Members::Table,
            Expr::col((Members::Table, Members::UserId)).equals((Users::Table, Users::Id)),
        )
        .and_where(Expr::col((Members::Table, Members::GroupId)).eq(group_id))
        .order_by((Members::Table, Members::MemberSince), Order::Asc)
        .order_by((Users::Table, Users::Username), Order::Asc)
        .limit(limit)
        .offset(offset)
        .build(SqliteQueryBuilder)
}

/// Groups a user belongs to: (id, name, is_admin, member_since).
pub fn list_for_user(user_id: &str, limit: u64, offset: u64) -> Built {
    Query::select()
        .column((Groups::Table, Groups::Id))
        .column((Groups::Table, Groups::Name))
        .column((Members::Table, Members::IsAdmin))
        .column((Members::Table, Members::MemberSince))
        .from(Groups::Table)
        .inner_join(
            Members::Table,
            Expr::col((Members::Table, Members::GroupId)).equals((Groups::Table, Groups::Id)),
        )
        .and_where(Expr::col((Members::Table, Members::UserId)).eq(user_id))
        .order_by((Members::Table, Members::MemberSince), Order::Desc)
        .order_by((Groups::Table, Groups::Name), Order::Asc)
        .limit(limit)
        .offset(offset)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_filters_by_both_keys() {
        let (sql, values) = exists("g1", "u1");
        assert!(sql.contains(r#""members"."group_id" = ?"#));
        assert!(sql.contains(r#""members"."user_id" = ?"#));
        // group id, user id, and the literal in `COUNT(*) > 0`
        assert_eq!(values.0.len(), 3);
    }

    #[test]
    fn admin_flag_projects_is_admin() {
        let (sql, values) = admin_flag("g1", "u1");
        assert!(sql.starts_with(r#"SELECT "members"."is_admin""#));
        assert_eq!(values.0.len(), 2);
    }
}
