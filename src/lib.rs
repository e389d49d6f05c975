//! stockroom - A multi-user item tracking service
//!
//! This crate provides an HTTP service where users register, log in, and
//! manage item records that each carry an uploaded file attachment. Items
//! are owned by the user that created them; only the owner may modify or
//! delete an item.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod server;
pub mod storage;
