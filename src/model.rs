pub mod auth;
pub mod config;
pub mod logical;
pub mod storage;
