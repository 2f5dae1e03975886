//! Bundle query builders.

use sea_query::{Alias, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::tables::{Bundles, Cards};
use super::{now_expr, Built};
use crate::patch::{BundlePatch, Valid};

pub fn get_by_id(bundle_id: &str) -> Built {
    Query::select()
        .columns([
            Bundles::Id,
            Bundles::Title,
            Bundles::Description,
            Bundles::GroupId,
            Bundles::CreatedAt,
            Bundles::UpdatedAt,
        ])
        .from(Bundles::Table)
        .and_where(Expr::col(Bundles::Id).eq(bundle_id))
        .build(SqliteQueryBuilder)
}

/// Summary columns (id, title, description, group_id, card_count) with the
/// card count aggregated through a LEFT JOIN so empty bundles count 0.
fn summary_select() -> sea_query::SelectStatement {
    Query::select()
        .column((Bundles::Table, Bundles::Id))
        .column((Bundles::Table, Bundles::Title))
        .column((Bundles::Table, Bundles::Description))
        .column((Bundles::Table, Bundles::GroupId))
        .expr_as(
            Func::count(Expr::col((Cards::Table, Cards::Id))),
            Alias::new("card_count"),
        )
        .from(Bundles::Table)
        .left_join(
            Cards::Table,
            Expr::col((Cards::Table, Cards::BundleId)).equals((Bundles::Table, Bundles::Id)),
        )
        .group_by_col((Bundles::Table, Bundles::Id))
        .to_owned()
}

pub fn summary(bundle_id: &str) -> Built {
    summary_select()
        .and_where(Expr::col((Bundles::Table, Bundles::Id)).eq(bundle_id))
        .build(SqliteQueryBuilder)
}

pub fn list_for_group(group_id: &str, limit: u64, offset: u64) -> Built {
    summary_select()
        .and_where(Expr::col((Bundles::Table, Bundles::GroupId)).eq(group_id))
        .order_by((Bundles::Table, Bundles::CreatedAt), Order::Asc)
        .order_by((Bundles::Table, Bundles::Title), Order::Asc)
        .limit(limit)
        .offset(offset)
        .build(SqliteQueryBuilder)
}

pub fn insert(id: &str, group_id: &str, title: &str, description: &str) -> Built {
    Query::insert()
        .into_table(Bundles::Table)
        .columns([
            Bundles::Id,
            Bundles::GroupId,
            Bundles::Title,
            Bundles::Description,
        ])
        .values_panic([id.into(), group_id.into(), title.into(), description.into()])
        .build(SqliteQueryBuilder)
}

pub fn update(bundle_id: &str, patch: &Valid<BundlePatch>) -> Built {
    let mut q = Query::update();
    q.table(Bundles::Table).value(Bundles::UpdatedAt, now_expr());
    if let Some(title) = &patch.title {
        q.value(Bundles::Title, title.as_str());
    }
    if let Some(description) = &patch.description {
        q.value(Bundles::Description, description.as_str());
    }
    q.and_where(Expr::col(Bundles::Id).eq(bundle_id))
        .build(SqliteQueryBuilder)
}

/// DELETE a bundle. Its cards go with it via FK cascade.
pub fn delete(bundle_id: &str) -> Built {
    Query::delete()
        .from_table(Bundles::Table)
        .and_where(Expr::col(Bundles::Id).eq(bundle_id))
        .build(SqliteQueryBuilder)
}
