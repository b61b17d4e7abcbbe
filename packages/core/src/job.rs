//! Job descriptor types for inbound creation requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

use crate::error::DescriptorError;

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a job ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally supplied description of one job.
///
/// The identity is always generated server-side. A caller-supplied `id` is
/// discarded on decode, and the identity can only change through
/// [`JobDescriptor::regenerate_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    #[serde(default, skip_deserializing)]
    id: JobId,
    /// Base URL the final result is delivered to.
    #[serde(default, alias = "webhook")]
    pub callback: String,
    /// Arbitrary caller-supplied fields describing the work.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JobDescriptor {
    /// Create a descriptor with a fresh identity and no fields.
    pub fn new(callback: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            callback: callback.into(),
            fields: Map::new(),
        }
    }

    /// Decode a descriptor from a JSON request body.
    ///
    /// Empty (or whitespace-only) bodies are rejected so the caller can treat
    /// them as "nothing to process".
    pub fn from_json(data: &str) -> Result<Self, DescriptorError> {
        if data.trim().is_empty() {
            return Err(DescriptorError::Empty);
        }

        let mut descriptor: Self = serde_json::from_str(data)?;
        descriptor.fields.remove("id");
        Ok(descriptor)
    }

    /// Add a caller field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The job's identity.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Replace the identity with a freshly generated one.
    pub fn regenerate_id(&mut self) -> JobId {
        self.id = JobId::new();
        self.id
    }

    /// Whether a callback address has been supplied.
    pub fn has_callback(&self) -> bool {
        !self.callback.trim().is_empty()
    }

    /// Delivery URL: the callback base with the identity appended as `id`.
    pub fn callback_url(&self) -> String {
        format!("{}?id={}", self.callback, self.id)
    }
}
