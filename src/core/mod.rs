pub mod actions;
pub mod app;
pub mod collaborator;
pub mod config;
pub mod conversation;
pub mod identity;
pub mod keyring;
pub mod message;
pub mod persistence;
pub mod router;
pub mod shortcuts;
pub mod store;
pub mod title;
