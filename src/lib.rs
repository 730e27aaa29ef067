pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod submission;
