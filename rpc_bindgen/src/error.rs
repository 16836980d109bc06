//! Error type definitions for failures that can occur while generating bindings.
use std::result;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A method's request or response type reference could not be resolved
    /// to a generated Rust type name.
    #[error("cannot resolve {which} type for method {service}.{method}")]
    UnresolvedType {
        service: String,
        method: String,
        which: &'static str,
    },

    /// The descriptor handed over by the caller is missing a required field.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// The validation hook rejected the schema before rendering.
    #[error("schema check failed for {file}")]
    CheckFailed {
        file: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = result::Result<T, Error>;
