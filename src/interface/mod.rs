//! # Interface Layer
//!
//! Command plugins invoked by the Dispatcher.

pub mod commands;
