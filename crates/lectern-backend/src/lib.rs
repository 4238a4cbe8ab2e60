//! Reading state controller and its persistence contract.
//!
//! This crate owns the in-memory snapshot of the reader's preferences and
//! position, notifies observers when it changes, and writes every change
//! through to a key-value store in the background.
//!
//! The layers, leaf first:
//! - [`store`]: the asynchronous key-value interface and its backends.
//! - [`repository`]: typed accessors with default-on-failure reads.
//! - [`controller`]: the observable snapshot and its mutation rules.

pub mod config;
pub mod content;
pub mod controller;
pub mod observer;
pub mod repository;
pub mod runtime;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use crate::controller::{ControllerError, Pending, Phase, StateController};
pub use crate::repository::{PersistenceError, SettingsRepository};
pub use crate::store::{PersistentStore, StoreError};
