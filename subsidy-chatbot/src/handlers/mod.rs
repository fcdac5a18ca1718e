//! HTTP handlers for the chatbot service.

pub mod app;
pub mod chat;
pub mod metrics;
