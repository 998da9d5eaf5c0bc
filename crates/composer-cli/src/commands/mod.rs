pub mod common;
pub mod compress;
pub mod config;
pub mod send;
pub mod stage;
