//! Delivery of job results to callback addresses.
//!
//! [`WebhookDelivery`] implements the dispatcher's [`dispatch::ResultDelivery`]
//! contract by POSTing each payload as JSON. Sends are fire-and-forget: every
//! payload gets a single attempt and failures are logged, never retried.

pub mod webhook;

pub use webhook::{DeliveryConfig, DeliveryError, WebhookDelivery};
