pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod expiry_scanner;
pub mod notify;
pub mod setup;
