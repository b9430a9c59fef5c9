pub mod bot;
pub mod config;
pub mod health;
pub mod quiz;
pub mod session;
