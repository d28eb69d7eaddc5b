//! Common test utilities for the resource dispatcher.
//!
//! - [`fixtures`] - A widget resource type with in-memory handlers
//! - [`harness`] - Test servers built around a widget manager
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;
