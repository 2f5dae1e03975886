//! Shared database schema, migrations, and query builders.
//!
//! Every builder returns a [`Built`] pair of SQL text and bind values for the
//! SQLite backend; the server binds the values and executes them.

pub mod authz;
pub mod bundles;
pub mod cards;
pub mod groups;
pub mod members;
pub mod migrations;
pub mod tables;
pub mod tokens;
pub mod users;

pub use tables::*;

pub type Built = (String, sea_query::Values);

/// SQL expression for "now" in the format SQLite's `datetime('now')` produces.
pub(crate) fn now_expr() -> sea_query::SimpleExpr {
    sea_query::Expr::cust("datetime('now')")
}
