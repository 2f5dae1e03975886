//! Ownership-traversal queries used for authorization.
//!
//! Each query answers "what is this user's standing in the group that owns
//! resource X" in a single round trip by joining down the ownership chain
//! Card → Bundle → Group ← Member. A resource id that does not exist simply
//! produces no row, which callers must read as deny.

use sea_query::{Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::tables::{Bundles, Cards, Members};
use super::Built;

fn members_join_bundles(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.from(Members::Table).inner_join(
        Bundles::Table,
        Expr::col((Bundles::Table, Bundles::GroupId)).equals((Members::Table, Members::GroupId)),
    )
}

/// Is the user a member of the group owning the bundle?
pub fn can_see_bundle(bundle_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0));
    members_join_bundles(&mut q)
        .and_where(Expr::col((Bundles::Table, Bundles::Id)).eq(bundle_id))
        .and_where(Expr::col((Members::Table, Members::UserId)).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// The user's admin flag in the group owning the bundle.
pub fn bundle_admin_flag(bundle_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.column((Members::Table, Members::IsAdmin));
    members_join_bundles(&mut q)
        .and_where(Expr::col((Bundles::Table, Bundles::Id)).eq(bundle_id))
        .and_where(Expr::col((Members::Table, Members::UserId)).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// The user's admin flag in the group owning the card's bundle.
pub fn card_admin_flag(card_id: &str, user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    q.column((Members::Table, Members::IsAdmin));
    members_join_bundles(&mut q)
        .inner_join(
            Cards::Table,
            Expr::col((Cards::Table, Cards::BundleId)).equals((Bundles::Table, Bundles::Id)),
        )
        .and_where(Expr::col((Cards::Table, Cards::Id)).eq(card_id))
        .and_where(Expr::col((Members::Table, Members::UserId)).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Owning group of a bundle.
pub fn bundle_owner(bundle_id: &str) -> Built {
    Query::select()
        .column(Bundles::GroupId)
        .from(Bundles::Table)
        .and_where(Expr::col(Bundles::Id).eq(bundle_id))
        .build(SqliteQueryBuilder)
}

/// Owning group of a card, through its bundle.
pub fn card_owner(card_id: &str) -> Built {
    Query::select()
        .column((Bundles::Table, Bundles::GroupId))
        .from(Cards::Table)
        .inner_join(
            Bundles::Table,
            Expr::col((Bundles::Table, Bundles::Id)).equals((Cards::Table, Cards::BundleId)),
        )
        .and_where(Expr::col((Cards::Table, Cards::Id)).eq(card_id))
        .build(SqliteQueryBuilder)
}
