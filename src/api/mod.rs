pub mod analysis;
pub mod chat;
pub mod error;
pub mod health;
pub mod openapi;
