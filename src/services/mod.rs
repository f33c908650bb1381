//! Storefront operations. Every function takes the acting user's id
//! explicitly and works against any sea-orm connection or transaction.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod media;
pub mod orders;
