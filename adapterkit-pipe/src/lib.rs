//! Transport between an adapter process and its host.
//!
//! The host starts the adapter as `<method> <input> <output>`, where both
//! paths are named pipes. Exactly one JSON document travels in each
//! direction: the host writes the [`AdapterInstance`] descriptor to `input`
//! and the adapter answers with one result on `output`. Closing the write
//! end marks the end of the message, so no framing is needed.
//!
//! Opening a pipe blocks until the other end is attached. Both ends of one
//! pipe must therefore be driven from different threads or processes.

mod error;
mod instance;
mod pipe;

pub use error::{PipeError, PipeResult};
pub use instance::{
    AdapterInstance, AdapterKey, CertificateConfig, ClusterConnectionInfo, CollectionWindow,
    CredentialConfig, CredentialField, InstanceIdentifier,
};
pub use pipe::{PipePair, read_from_pipe, write_to_pipe};
