//! Card query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::Cards;
use super::{now_expr, Built};
use crate::patch::{CardPatch, Valid};

fn card_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.columns([
        Cards::Id,
        Cards::BundleId,
        Cards::Question,
        Cards::Answer,
        Cards::CreatedAt,
        Cards::UpdatedAt,
    ])
}

pub fn get_by_id(card_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    card_columns(&mut q);
    q.from(Cards::Table)
        .and_where(Expr::col(Cards::Id).eq(card_id))
        .build(SqliteQueryBuilder)
}

pub fn list_for_bundle(bundle_id: &str, limit: u64, offset: u64) -> Built {
    let mut q = Query::select().to_owned();
    card_columns(&mut q);
    q.from(Cards::Table)
        .and_where(Expr::col(Cards::BundleId).eq(bundle_id))
        .order_by(Cards::CreatedAt, Order::Asc)
        .order_by(Cards::Question, Order::Asc)
        .limit(limit)
        .offset(offset)
        .build(SqliteQueryBuilder)
}

pub fn insert(id: &str, bundle_id: &str, question: &str, answer: &str) -> Built {
    Query::insert()
        .into_table(Cards::Table)
        .columns([Cards::Id, Cards::BundleId, Cards::Question, Cards::Answer])
        .values_panic([id.into(), bundle_id.into(), question.into(), answer.into()])
        .build(SqliteQueryBuilder)
}

pub fn update(card_id: &str, patch: &Valid<CardPatch>) -> Built {
    let mut q = Query::update();
    q.table(Cards::Table).value(Cards::UpdatedAt, now_expr());
    if let Some(question) = &patch.question {
        q.value(Cards::Question, question.as_str());
    }
    if let Some(answer) = &patch.answer {
        q.value(Cards::Answer, answer.as_str());
    }
    q.and_where(Expr::col(Cards::Id).eq(card_id))
        .build(SqliteQueryBuilder)
}

pub fn delete(card_id: &str) -> Built {
    Query::delete()
        .from_table(Cards::Table)
        .and_where(Expr::col(Cards::Id).eq(card_id))
        .build(SqliteQueryBuilder)
}

/// DELETE every card of a bundle.
pub fn delete_for_bundle(bundle_id: &str) -> Built {
    Query::delete()
        .from_table(Cards::Table)
        .and_where(Expr::col(Cards::BundleId).eq(bundle_id))
        .build(SqliteQueryBuilder)
}
