//! # Equipment Interface
//!
//! This module defines the interfaces which equipment drivers must implement to be used by the
//! navigation software.
//!
//! Drivers are owned by exactly one task, so all traits require `Send` but not `Sync`.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod drive;
pub mod pan;
pub mod range;

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Errors raised by equipment drivers.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("The equipment has already been released")]
    Released,

    #[error("Equipment IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Equipment fault: {0}")]
    Fault(String),
}
