pub mod bundles;
pub mod cards;
pub mod groups;
pub mod health;
pub mod members;
pub mod users;
