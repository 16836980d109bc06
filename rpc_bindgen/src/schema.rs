//! In-memory model of the services declared by one schema file.
//!
//! This is the read-only input of the generator. The caller owns decoding
//! the compiler's wire envelope into descriptors; the conversion here only
//! lifts an already-decoded `FileDescriptorProto` into the model.
use std::fmt;

use prost_types::FileDescriptorProto;

use crate::error::{Error, Result};

/// All services declared by one input schema file.
#[derive(Clone, Debug)]
pub struct FileSchema {
    /// Input file name, e.g. `greeter.proto`.
    pub name: String,
    /// Dotted package name, possibly empty.
    pub package: String,
    pub services: Vec<Service>,
}

#[derive(Clone, Debug)]
pub struct Service {
    /// Simple name, e.g. `Greeter`.
    pub name: String,
    /// Fully-qualified schema name with leading dot, e.g. `.pkg.Greeter`.
    pub fqsn: String,
    /// Methods in schema declaration order.
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub request_type: TypeRef,
    pub response_type: TypeRef,
}

/// A fully-qualified message name with leading dot, e.g. `.pkg.Widget`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(fqmn: impl Into<String>) -> Self {
        Self(fqmn.into())
    }

    pub fn fqmn(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the fixed import manifest rendered into generated files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// Module path as it appears in a `use` declaration.
    pub path: String,
    /// Standard-library imports are grouped before third-party ones.
    pub standard: bool,
}

impl Import {
    pub fn std(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            standard: true,
        }
    }

    pub fn external(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            standard: false,
        }
    }
}

impl FileSchema {
    /// Lifts a decoded file descriptor into the schema model.
    ///
    /// Fails if a service or method is missing its name or one of its type
    /// references; the generator has nothing sensible to emit for those.
    pub fn from_descriptor(fd: &FileDescriptorProto) -> Result<Self> {
        let name = fd.name().to_string();
        let package = fd.package().to_string();

        let mut services = Vec::with_capacity(fd.service.len());
        for sd in &fd.service {
            let service_name = sd
                .name
                .clone()
                .ok_or_else(|| Error::MalformedDescriptor(format!("unnamed service in {name}")))?;
            let fqsn = if package.is_empty() {
                format!(".{service_name}")
            } else {
                format!(".{package}.{service_name}")
            };

            let mut methods = Vec::with_capacity(sd.method.len());
            for md in &sd.method {
                let method_name = md.name.clone().ok_or_else(|| {
                    Error::MalformedDescriptor(format!("unnamed method in service {service_name}"))
                })?;
                let request_type = md.input_type.clone().ok_or_else(|| {
                    Error::MalformedDescriptor(format!(
                        "method {service_name}.{method_name} has no input type"
                    ))
                })?;
                let response_type = md.output_type.clone().ok_or_else(|| {
                    Error::MalformedDescriptor(format!(
                        "method {service_name}.{method_name} has no output type"
                    ))
                })?;

                methods.push(Method {
                    name: method_name,
                    client_streaming: md.client_streaming(),
                    server_streaming: md.server_streaming(),
                    request_type: TypeRef::new(request_type),
                    response_type: TypeRef::new(response_type),
                });
            }

            services.push(Service {
                name: service_name,
                fqsn,
                methods,
            });
        }

        Ok(Self {
            name,
            package,
            services,
        })
    }
}
