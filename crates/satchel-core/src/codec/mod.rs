//! # Serialization pipeline
//!
//! Beans are any `Serialize`/`DeserializeOwned` values. Saving walks the
//! bean into an in-memory object graph with [`encoder::GraphEncoder`],
//! wraps it in a versioned [`document::Document`] and renders it in the
//! configured [`DataFormat`]. Loading parses the document, rebuilds the
//! records written by persistence delegates and deserializes the bean.
//!
//! Both directions run to completion in memory before anything is handed to
//! a storage backend, and both fail as a whole on the first error.
pub mod decoder;
pub mod delegate;
pub mod document;
pub mod encoder;
pub mod error;
pub mod fixes;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use delegate::{DelegateRegistry, Instantiation, PersistenceDelegate, Statement};
pub use document::Document;
pub use error::CodecError;

use crate::storage::config::DataFormat;

/// Encode a bean into the bytes of a stored entry
pub fn encode<T: Serialize + ?Sized>(
    bean: &T,
    registry: &DelegateRegistry,
    format: DataFormat,
) -> Result<Vec<u8>, CodecError> {
    let graph = encoder::encode_graph(bean, registry)?;
    Document::new(graph).to_bytes(format)
}

/// Decode the bytes of a stored entry into a bean
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    registry: &DelegateRegistry,
    format: DataFormat,
) -> Result<T, CodecError> {
    let document = Document::from_bytes(bytes, format)?;
    decoder::decode_graph(document.root, registry)
}
