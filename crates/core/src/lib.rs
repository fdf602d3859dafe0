//! # Clinic Core
//!
//! Typed access to the clinic administration backend.
//!
//! This crate contains the data layer below any UI:
//! - resource models, closed list filters and request bodies ([`models`])
//! - the `{status, message, data}` envelope and its decoding ([`envelope`])
//! - one resource client per backend resource ([`clients`]), all sharing an [`ApiClient`]
//! - form validation schemas that run before any request is built ([`schema`])
//! - the transport seam, with a reqwest implementation ([`transport`])
//!
//! **No caching here**: clients are stateless. Query keys, the cache and mutation lifecycles
//! live in `clinic-query`.

pub mod attachment;
pub mod client;
pub mod clients;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod models;
pub mod payload;
pub mod schema;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use attachment::{Attachment, TaggedAttachment};
pub use client::{ApiClient, StatusChange, Update};
pub use config::ClientConfig;
pub use envelope::ApiResponse;
pub use error::{ClientError, ClientResult};
pub use schema::{FieldError, FormBody, RawForm, ValidationErrors};
pub use transport::{HttpTransport, Transport};

pub use clinic_types::{EmailAddress, NonEmptyText, TextError};
