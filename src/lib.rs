//! Chatflow - multi-user conversational workflow engine.
//!
//! Workflows are graphs of prompts triggered by a bot command. The engine
//! tracks where each user is, validates their answers, follows straight or
//! conditional edges, and hands back the collected answers when a user
//! reaches the end.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
