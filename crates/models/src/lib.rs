pub mod auth;
pub mod collection;
pub mod entity;
pub mod field_descriptor;
pub mod member;
pub mod user;
