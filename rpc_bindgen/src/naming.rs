//! Naming conventions for generated symbols and output files.
use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::schema::{Method, Service, TypeRef};

/// Strips the leading separator from a fully-qualified schema name,
/// turning `.pkg.Widget` into the transport-routing name `pkg.Widget`.
/// Names without a leading separator are returned unchanged.
pub fn trim_leading_dot(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}

/// Derives the output file name by replacing the input's extension with
/// the configured suffix: `a/b/widget.proto` becomes `a/b/widget.rpc.rs`.
pub fn output_name(input: &str, suffix: &str) -> String {
    let stem = match input.rfind('.') {
        // Keep directory components intact when the dot belongs to one.
        Some(idx) if !input[idx..].contains('/') => &input[..idx],
        _ => input,
    };
    format!("{stem}.{suffix}")
}

/// Resolves a fully-qualified message name to the Rust path the emitted
/// code spells it with. Same-package types stay bare; cross-package types
/// are addressed through the crate's module-per-package layout. Returns
/// `None` when the reference has no type segment to resolve.
pub fn rust_type_path(type_ref: &TypeRef, file_package: &str) -> Option<String> {
    let fqmn = trim_leading_dot(type_ref.fqmn());
    if fqmn.is_empty() {
        return None;
    }

    let (package, simple) = match fqmn.rfind('.') {
        Some(idx) => (&fqmn[..idx], &fqmn[idx + 1..]),
        None => ("", fqmn),
    };
    if simple.is_empty() {
        return None;
    }

    let type_name = simple.to_upper_camel_case();
    if package == file_package {
        Some(type_name)
    } else {
        let mut path = String::from("crate");
        for segment in package.split('.').filter(|s| !s.is_empty()) {
            path.push_str("::");
            path.push_str(&segment.to_snake_case());
        }
        path.push_str("::");
        path.push_str(&type_name);
        Some(path)
    }
}

pub fn method_fn_name(method: &Method) -> String {
    method.name.to_snake_case()
}

pub fn client_trait(service: &Service) -> String {
    format!("{}RpcClient", service.name.to_upper_camel_case())
}

pub fn server_trait(service: &Service) -> String {
    format!("{}RpcServer", service.name.to_upper_camel_case())
}

pub fn caller_struct(service: &Service) -> String {
    format!("{}RpcCaller", service.name.to_upper_camel_case())
}

pub fn handler_struct(service: &Service) -> String {
    format!("{}RpcHandler", service.name.to_upper_camel_case())
}

/// Per-method stream interface on the client side, e.g.
/// `GreeterServiceChatRpcClientStream`.
pub fn client_stream_trait(service: &Service, method: &Method) -> String {
    format!(
        "{}Service{}RpcClientStream",
        service.name.to_upper_camel_case(),
        method.name.to_upper_camel_case()
    )
}

/// Per-method stream interface on the server side.
pub fn server_stream_trait(service: &Service, method: &Method) -> String {
    format!(
        "{}Service{}RpcServerStream",
        service.name.to_upper_camel_case(),
        method.name.to_upper_camel_case()
    )
}

/// Concrete wrapper implementing the server-side stream interface over the
/// raw transport stream.
pub fn server_stream_struct(service: &Service, method: &Method) -> String {
    format!("{}Wrapper", server_stream_trait(service, method))
}

pub fn client_builder_fn(service: &Service) -> String {
    format!("new_{}_rpc_client", service.name.to_snake_case())
}

pub fn procedures_fn(service: &Service) -> String {
    format!("build_{}_rpc_procedures", service.name.to_snake_case())
}

pub fn register_client_builder_fn(service: &Service) -> String {
    format!(
        "register_{}_rpc_client_builder",
        service.name.to_snake_case()
    )
}

pub fn request_ctor(service: &Service, method: &Method) -> String {
    format!(
        "new_{}_{}_rpc_request",
        service.name.to_snake_case(),
        method.name.to_snake_case()
    )
}

pub fn response_ctor(service: &Service, method: &Method) -> String {
    format!(
        "new_{}_{}_rpc_response",
        service.name.to_snake_case(),
        method.name.to_snake_case()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str) -> Service {
        Service {
            name: name.to_string(),
            fqsn: format!(".pkg.{name}"),
            methods: vec![],
        }
    }

    fn method(name: &str) -> Method {
        Method {
            name: name.to_string(),
            client_streaming: false,
            server_streaming: false,
            request_type: TypeRef::new(".pkg.Request"),
            response_type: TypeRef::new(".pkg.Response"),
        }
    }

    #[test]
    fn trims_only_the_leading_dot() {
        assert_eq!(trim_leading_dot(".pkg.Widget"), "pkg.Widget");
        assert_eq!(trim_leading_dot("pkg.Widget"), "pkg.Widget");
        assert_eq!(trim_leading_dot(""), "");
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_name("widget.proto", "rpc.rs"), "widget.rpc.rs");
        assert_eq!(output_name("a/b/widget.proto", "rpc.rs"), "a/b/widget.rpc.rs");
        // No extension: the suffix is appended.
        assert_eq!(output_name("widget", "rpc.rs"), "widget.rpc.rs");
        // A dot inside a directory name is not an extension.
        assert_eq!(output_name("v1.2/widget", "rpc.rs"), "v1.2/widget.rpc.rs");
    }

    #[test]
    fn same_package_types_stay_bare() {
        let t = TypeRef::new(".pkg.SayHelloRequest");
        assert_eq!(rust_type_path(&t, "pkg").as_deref(), Some("SayHelloRequest"));
    }

    #[test]
    fn cross_package_types_get_crate_paths() {
        let t = TypeRef::new(".other.sub.Widget");
        assert_eq!(
            rust_type_path(&t, "pkg").as_deref(),
            Some("crate::other::sub::Widget")
        );
    }

    #[test]
    fn empty_reference_does_not_resolve() {
        assert_eq!(rust_type_path(&TypeRef::new(""), "pkg"), None);
        assert_eq!(rust_type_path(&TypeRef::new("."), "pkg"), None);
    }

    #[test]
    fn symbol_names_follow_the_conventions() {
        let svc = service("Greeter");
        let m = method("SayHello");
        assert_eq!(client_trait(&svc), "GreeterRpcClient");
        assert_eq!(server_trait(&svc), "GreeterRpcServer");
        assert_eq!(caller_struct(&svc), "GreeterRpcCaller");
        assert_eq!(handler_struct(&svc), "GreeterRpcHandler");
        assert_eq!(
            client_stream_trait(&svc, &m),
            "GreeterServiceSayHelloRpcClientStream"
        );
        assert_eq!(
            server_stream_struct(&svc, &m),
            "GreeterServiceSayHelloRpcServerStreamWrapper"
        );
        assert_eq!(client_builder_fn(&svc), "new_greeter_rpc_client");
        assert_eq!(procedures_fn(&svc), "build_greeter_rpc_procedures");
        assert_eq!(
            register_client_builder_fn(&svc),
            "register_greeter_rpc_client_builder"
        );
        assert_eq!(request_ctor(&svc, &m), "new_greeter_say_hello_rpc_request");
        assert_eq!(response_ctor(&svc, &m), "new_greeter_say_hello_rpc_response");
        assert_eq!(method_fn_name(&m), "say_hello");
    }
}
