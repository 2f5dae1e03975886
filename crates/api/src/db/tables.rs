//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Groups {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
pub enum Members {
    Table,
    GroupId,
    UserId,
    IsAdmin,
    MemberSince,
}

#[derive(Iden)]
pub enum Bundles {
    Table,
    Id,
    Title,
    Description,
    GroupId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Cards {
    Table,
    Id,
    BundleId,
    Question,
    Answer,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Tokens {
    Table,
    Token,
    UserId,
    Expires,
}
