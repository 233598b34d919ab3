pub mod accounts;
pub mod admin;
pub mod entries;
pub mod health;
