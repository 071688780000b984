//! Core types and utilities for reqassist
//!
//! This crate provides the configuration layer, the persisted chat
//! session, and the request lifecycle state machine used by the other
//! reqassist components.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
