//! Freqtrade Notifier - relays trading bot webhooks as email alerts.
//!
//! This library backs two binaries:
//! - `notifier-web`: web server receiving Freqtrade webhooks
//! - `notifier-send`: sends sample webhooks to a running server
//!
//! ## Architecture
//!
//! ```text
//! Freqtrade → POST /webhook → auth → format → MailSender (SES v2) → inbox
//! ```

pub mod config;
pub mod format;
pub mod mail;
pub mod web;

// Re-export commonly used types
pub use config::{AwsCredentials, Config};
pub use format::{format_event, EmailContent, FormatError};
pub use mail::{DeliveryError, MailSender, SesMailer};
pub use web::{router, AppError, AppState};
