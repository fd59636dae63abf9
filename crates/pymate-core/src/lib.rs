//! PATH state management for PyMate.
//!
//! The [`reconcile`] engine owns the persistent PATH contributions of the
//! tool, [`session`] writes the per-shell activation script, and
//! [`context`] decides which interpreter is "active" for a command.

pub use error::{Error, Result};

pub mod context;
pub mod discovery;
mod error;
pub mod features;
pub mod interpreter;
pub mod layout;
pub mod reconcile;
pub mod registry;
pub mod scope;
pub mod select;
pub mod session;
pub mod state;
pub mod status;
