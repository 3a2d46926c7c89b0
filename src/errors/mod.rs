//! # Error Handling
//!
//! Every workflow in this crate returns [`Result`], whose error side is the
//! taxonomy in [`Error`]. Store contracts keep their own
//! [`SecretsError`](crate::secrets::SecretsError), which converts into
//! [`Error::SecretStore`] unchanged.

mod types;

pub use types::{DeliveryPart, Error, NotFoundReason, Result};
