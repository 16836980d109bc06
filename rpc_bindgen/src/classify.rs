//! Partitioning of service methods into the five calling shapes.
//!
//! The shape decides which family of interfaces and adapters the renderer
//! emits for a method. Classification is a pure function of the two
//! streaming flags plus the oneway sentinel comparison; the renderer only
//! ever sees the partitioned [`MethodGroups`].
use crate::schema::{Method, Service};

/// The well-known response type marking a call as fire-and-forget.
///
/// Compared by string equality against the method's fully-qualified
/// response name. The comparison only applies when both streaming flags
/// are false.
pub const ONEWAY_SENTINEL: &str = ".rpc.Oneway";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallShape {
    Unary,
    Oneway,
    ClientStreaming,
    ServerStreaming,
    BidiStreaming,
}

/// Computes the calling shape of a method.
///
/// Total over all inputs; the five shapes are mutually exclusive and
/// collectively exhaustive.
pub fn call_shape(method: &Method) -> CallShape {
    match (method.client_streaming, method.server_streaming) {
        (true, true) => CallShape::BidiStreaming,
        (true, false) => CallShape::ClientStreaming,
        (false, true) => CallShape::ServerStreaming,
        (false, false) => {
            if method.response_type.fqmn() == ONEWAY_SENTINEL {
                CallShape::Oneway
            } else {
                CallShape::Unary
            }
        }
    }
}

/// A service's methods partitioned by calling shape.
///
/// Each group preserves the original declaration order; every method of
/// the service appears in exactly one group.
#[derive(Debug, Default)]
pub struct MethodGroups<'a> {
    unary: Vec<&'a Method>,
    oneway: Vec<&'a Method>,
    client_streaming: Vec<&'a Method>,
    server_streaming: Vec<&'a Method>,
    bidi_streaming: Vec<&'a Method>,
}

impl<'a> MethodGroups<'a> {
    pub fn unary(&self) -> &[&'a Method] {
        &self.unary
    }

    pub fn oneway(&self) -> &[&'a Method] {
        &self.oneway
    }

    pub fn client_streaming(&self) -> &[&'a Method] {
        &self.client_streaming
    }

    pub fn server_streaming(&self) -> &[&'a Method] {
        &self.server_streaming
    }

    pub fn bidi_streaming(&self) -> &[&'a Method] {
        &self.bidi_streaming
    }
}

/// Partitions a service's methods into the five shape groups.
pub fn classify(service: &Service) -> MethodGroups<'_> {
    let mut groups = MethodGroups::default();
    for method in &service.methods {
        match call_shape(method) {
            CallShape::Unary => groups.unary.push(method),
            CallShape::Oneway => groups.oneway.push(method),
            CallShape::ClientStreaming => groups.client_streaming.push(method),
            CallShape::ServerStreaming => groups.server_streaming.push(method),
            CallShape::BidiStreaming => groups.bidi_streaming.push(method),
        }
    }
    groups
}
