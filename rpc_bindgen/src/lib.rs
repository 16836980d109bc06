//! Binding generator turning protobuf service descriptors into client and
//! server RPC interfaces for a transport runtime.
//!
//! The pipeline per input file: lift an already-decoded descriptor into a
//! [`schema::FileSchema`], partition each service's methods by calling
//! shape ([`classify`]), render the shape families into one artifact
//! ([`render`]), and hand the named output back to the caller
//! ([`runner::Generator`]). The caller owns the compiler plugin envelope
//! and all file I/O.
pub mod classify;
pub mod error;
pub mod naming;
pub mod render;
pub mod runner;
pub mod schema;

pub use error::{Error, Result};
pub use runner::{GeneratedFile, Generator};
