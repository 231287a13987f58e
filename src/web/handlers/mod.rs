//! # Web API Handlers

pub mod forwarding;
pub mod health;
pub mod trigger;
pub mod webhook;
