//! Transport capability.
//!
//! The core never opens connections itself. Whatever actually talks to the
//! search cluster implements [`SearchTransport`] and is handed to
//! [`crate::Connection`]. Pooling, retries and timeouts belong to the
//! implementation; errors it returns reach the caller unchanged.

pub mod memory;
pub mod traits;

pub use memory::{RecordingTransport, RequestKind};
pub use traits::{SearchTransport, TransportError};
