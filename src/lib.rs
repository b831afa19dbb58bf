//! Chatbot Setup: connects a Telegram bot to the AI-response backend.

pub mod api;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod notify;
pub mod wizard;
