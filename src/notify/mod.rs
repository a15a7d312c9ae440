//! Notification module for announcing new listings
//!
//! This module provides:
//! - `compose`: subject, HTML and plain-text bodies for a diff result
//! - `Mailer`: the delivery capability, with an SMTP implementation

mod compose;
mod mailer;

pub use compose::{compose, Notification};
pub use mailer::{Mailer, SmtpMailer};

use thiserror::Error;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Result type alias for notification operations
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
