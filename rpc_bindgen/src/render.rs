//! Text assembly for one generated binding artifact.
//!
//! Rendering consumes the classified method groups and produces the full
//! artifact text for one schema file. The emitted code targets the
//! transport runtime rooted at [`RUNTIME`]; all runtime paths are spelled
//! out in full so the generated file only needs the fixed import manifest.
use std::fmt::Write;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{FileSchema, Import, Method, Service};

/// Module path of the transport runtime referenced by emitted code.
pub const RUNTIME: &str = "crate::rpc::runtime";

/// A method with its type references resolved to Rust paths.
struct MethodView<'a> {
    method: &'a Method,
    fn_name: String,
    request: String,
    response: String,
}

impl<'a> MethodView<'a> {
    fn resolve(service: &Service, method: &'a Method, package: &str) -> Result<Self> {
        let request = naming::rust_type_path(&method.request_type, package).ok_or_else(|| {
            Error::UnresolvedType {
                service: service.name.clone(),
                method: method.name.clone(),
                which: "request",
            }
        })?;
        let response = naming::rust_type_path(&method.response_type, package).ok_or_else(|| {
            Error::UnresolvedType {
                service: service.name.clone(),
                method: method.name.clone(),
                which: "response",
            }
        })?;
        Ok(Self {
            method,
            fn_name: naming::method_fn_name(method),
            request,
            response,
        })
    }
}

fn resolve_group<'a>(
    service: &Service,
    methods: &[&'a Method],
    package: &str,
) -> Result<Vec<MethodView<'a>>> {
    methods
        .iter()
        .map(|&m| MethodView::resolve(service, m, package))
        .collect()
}

/// Renders the complete artifact text for one schema file.
///
/// Deterministic and stateless; the same schema always produces
/// byte-identical output.
pub fn render_file(schema: &FileSchema, imports: &[Import]) -> Result<String> {
    let mut buf = String::new();

    writeln!(buf, "// Code generated by rpc_bindgen. DO NOT EDIT.").unwrap();
    writeln!(buf, "// source: {}", schema.name).unwrap();

    if !schema.services.is_empty() {
        writeln!(buf).unwrap();
        render_imports(&mut buf, imports);
    }

    for service in &schema.services {
        render_service(&mut buf, schema, service)?;
    }

    Ok(buf)
}

/// Emits the fixed import manifest, standard group first, manifest order
/// within each group.
fn render_imports(buf: &mut String, imports: &[Import]) {
    let std_imports: Vec<_> = imports.iter().filter(|i| i.standard).collect();
    let ext_imports: Vec<_> = imports.iter().filter(|i| !i.standard).collect();

    for import in &std_imports {
        writeln!(buf, "use {};", import.path).unwrap();
    }
    if !std_imports.is_empty() && !ext_imports.is_empty() {
        writeln!(buf).unwrap();
    }
    for import in &ext_imports {
        writeln!(buf, "use {};", import.path).unwrap();
    }
}

fn render_service(buf: &mut String, schema: &FileSchema, service: &Service) -> Result<()> {
    let package = schema.package.as_str();
    let groups = classify(service);

    let unary = resolve_group(service, groups.unary(), package)?;
    let oneway = resolve_group(service, groups.oneway(), package)?;
    let client_streaming = resolve_group(service, groups.client_streaming(), package)?;
    let server_streaming = resolve_group(service, groups.server_streaming(), package)?;
    let bidi_streaming = resolve_group(service, groups.bidi_streaming(), package)?;

    // Constructors are emitted for every method in declaration order.
    let all = service
        .methods
        .iter()
        .map(|m| MethodView::resolve(service, m, package))
        .collect::<Result<Vec<_>>>()?;

    let ns = RUNTIME;
    let routing_name = naming::trim_leading_dot(&service.fqsn);
    let client_trait = naming::client_trait(service);
    let server_trait = naming::server_trait(service);
    let caller_struct = naming::caller_struct(service);
    let handler_struct = naming::handler_struct(service);

    let mut client_trait_methods = String::new();
    let mut client_stream_traits = String::new();
    let mut server_trait_methods = String::new();
    let mut server_stream_traits = String::new();
    let mut caller_methods = String::new();
    let mut handler_methods = String::new();
    let mut stream_wrappers = String::new();
    let mut message_ctors = String::new();

    for view in &unary {
        writeln!(
            client_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<{response}>;",
            fn_name = view.fn_name,
            request = view.request,
            response = view.response,
        )
        .unwrap();
        writeln!(
            server_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<{response}>;",
            fn_name = view.fn_name,
            request = view.request,
            response = view.response,
        )
        .unwrap();
        write!(
            caller_methods,
            r#"    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<{response}> {{
        let response = self
            .client
            .call(ctx, "{name}", Box::new(request), {response_ctor})
            .await?;
        match response.into_any().downcast::<{response}>() {{
            Ok(response) => Ok(*response),
            Err(actual) => Err({ns}::error::cast_error(&{response}::default(), actual)),
        }}
    }}
"#,
            fn_name = view.fn_name,
            name = view.method.name,
            request = view.request,
            response = view.response,
            response_ctor = naming::response_ctor(service, view.method),
        )
        .unwrap();
        write!(
            handler_methods,
            r#"    async fn {fn_name}(&self, ctx: {ns}::context::CallContext, request: Box<dyn {ns}::transport::RpcMessage>) -> {ns}::error::Result<Box<dyn {ns}::transport::RpcMessage>> {{
        let request = match request.into_any().downcast::<{request}>() {{
            Ok(request) => *request,
            Err(actual) => return Err({ns}::error::cast_error(&{request}::default(), actual)),
        }};
        let response = self.server.{fn_name}(&ctx, request).await?;
        Ok(Box::new(response) as Box<dyn {ns}::transport::RpcMessage>)
    }}
"#,
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
    }

    for view in &oneway {
        writeln!(
            client_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<{ns}::transport::Ack>;",
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
        writeln!(
            server_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<()>;",
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
        write!(
            caller_methods,
            r#"    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<{ns}::transport::Ack> {{
        self.client.call_oneway(ctx, "{name}", Box::new(request)).await
    }}
"#,
            fn_name = view.fn_name,
            name = view.method.name,
            request = view.request,
        )
        .unwrap();
        write!(
            handler_methods,
            r#"    async fn {fn_name}(&self, ctx: {ns}::context::CallContext, request: Box<dyn {ns}::transport::RpcMessage>) -> {ns}::error::Result<()> {{
        let request = match request.into_any().downcast::<{request}>() {{
            Ok(request) => *request,
            Err(actual) => return Err({ns}::error::cast_error(&{request}::default(), actual)),
        }};
        self.server.{fn_name}(&ctx, request).await
    }}
"#,
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
    }

    for view in &client_streaming {
        let stream_client = naming::client_stream_trait(service, view.method);
        let stream_server = naming::server_stream_trait(service, view.method);
        let wrapper = naming::server_stream_struct(service, view.method);

        writeln!(
            client_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext) -> {ns}::error::Result<Box<dyn {stream_client}>>;",
            fn_name = view.fn_name,
        )
        .unwrap();
        writeln!(
            server_trait_methods,
            "    async fn {fn_name}(&self, stream: Box<dyn {stream_server}>) -> {ns}::error::Result<{response}>;",
            fn_name = view.fn_name,
            response = view.response,
        )
        .unwrap();
        write!(
            client_stream_traits,
            r#"/// Sends `{request}` messages and receives the single `{response}` once sending is done.
#[async_trait]
pub trait {stream_client}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn send(&mut self, request: {request}) -> {ns}::error::Result<()>;
    async fn close_and_recv(&mut self) -> {ns}::error::Result<{response}>;
}}

"#,
            request = view.request,
            response = view.response,
        )
        .unwrap();
        write!(
            server_stream_traits,
            r#"/// Receives `{request}` messages from the client.
#[async_trait]
pub trait {stream_server}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn recv(&mut self) -> {ns}::error::Result<Option<{request}>>;
}}

"#,
            request = view.request,
        )
        .unwrap();
        write!(
            caller_methods,
            r#"    async fn {fn_name}(&self, _ctx: &{ns}::context::CallContext) -> {ns}::error::Result<Box<dyn {stream_client}>> {{
        Err({ns}::error::unimplemented("stream wiring for {service_name}.{name}"))
    }}
"#,
            fn_name = view.fn_name,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
        write!(
            handler_methods,
            r#"    async fn {fn_name}(&self, stream: {ns}::transport::ServerStream) -> {ns}::error::Result<{response}> {{
        self.server.{fn_name}(Box::new({wrapper} {{ stream }})).await
    }}
"#,
            fn_name = view.fn_name,
            response = view.response,
        )
        .unwrap();
        write!(
            stream_wrappers,
            r#"struct {wrapper} {{
    stream: {ns}::transport::ServerStream,
}}

#[async_trait]
impl {stream_server} for {wrapper} {{
    fn context(&self) -> &{ns}::context::CallContext {{
        self.stream.context()
    }}

    async fn recv(&mut self) -> {ns}::error::Result<Option<{request}>> {{
        Err({ns}::error::unimplemented("stream receive for {service_name}.{name}"))
    }}
}}

"#,
            request = view.request,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
    }

    for view in &server_streaming {
        let stream_client = naming::client_stream_trait(service, view.method);
        let stream_server = naming::server_stream_trait(service, view.method);
        let wrapper = naming::server_stream_struct(service, view.method);

        writeln!(
            client_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext, request: {request}) -> {ns}::error::Result<Box<dyn {stream_client}>>;",
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
        writeln!(
            server_trait_methods,
            "    async fn {fn_name}(&self, request: {request}, stream: Box<dyn {stream_server}>) -> {ns}::error::Result<()>;",
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
        write!(
            client_stream_traits,
            r#"/// Receives `{response}` messages until the stream completes.
#[async_trait]
pub trait {stream_client}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn recv(&mut self) -> {ns}::error::Result<Option<{response}>>;
}}

"#,
            response = view.response,
        )
        .unwrap();
        write!(
            server_stream_traits,
            r#"/// Sends `{response}` messages to the client.
#[async_trait]
pub trait {stream_server}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn send(&mut self, response: {response}) -> {ns}::error::Result<()>;
}}

"#,
            response = view.response,
        )
        .unwrap();
        write!(
            caller_methods,
            r#"    async fn {fn_name}(&self, _ctx: &{ns}::context::CallContext, _request: {request}) -> {ns}::error::Result<Box<dyn {stream_client}>> {{
        Err({ns}::error::unimplemented("stream wiring for {service_name}.{name}"))
    }}
"#,
            fn_name = view.fn_name,
            request = view.request,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
        write!(
            handler_methods,
            r#"    async fn {fn_name}(&self, request: Box<dyn {ns}::transport::RpcMessage>, stream: {ns}::transport::ServerStream) -> {ns}::error::Result<()> {{
        let request = match request.into_any().downcast::<{request}>() {{
            Ok(request) => *request,
            Err(actual) => return Err({ns}::error::cast_error(&{request}::default(), actual)),
        }};
        self.server.{fn_name}(request, Box::new({wrapper} {{ stream }})).await
    }}
"#,
            fn_name = view.fn_name,
            request = view.request,
        )
        .unwrap();
        write!(
            stream_wrappers,
            r#"struct {wrapper} {{
    stream: {ns}::transport::ServerStream,
}}

#[async_trait]
impl {stream_server} for {wrapper} {{
    fn context(&self) -> &{ns}::context::CallContext {{
        self.stream.context()
    }}

    async fn send(&mut self, _response: {response}) -> {ns}::error::Result<()> {{
        Err({ns}::error::unimplemented("stream send for {service_name}.{name}"))
    }}
}}

"#,
            response = view.response,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
    }

    for view in &bidi_streaming {
        let stream_client = naming::client_stream_trait(service, view.method);
        let stream_server = naming::server_stream_trait(service, view.method);
        let wrapper = naming::server_stream_struct(service, view.method);

        writeln!(
            client_trait_methods,
            "    async fn {fn_name}(&self, ctx: &{ns}::context::CallContext) -> {ns}::error::Result<Box<dyn {stream_client}>>;",
            fn_name = view.fn_name,
        )
        .unwrap();
        writeln!(
            server_trait_methods,
            "    async fn {fn_name}(&self, stream: Box<dyn {stream_server}>) -> {ns}::error::Result<()>;",
            fn_name = view.fn_name,
        )
        .unwrap();
        write!(
            client_stream_traits,
            r#"/// Sends `{request}` messages and receives `{response}` messages until the stream completes.
#[async_trait]
pub trait {stream_client}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn send(&mut self, request: {request}) -> {ns}::error::Result<()>;
    async fn recv(&mut self) -> {ns}::error::Result<Option<{response}>>;
    async fn close_send(&mut self) -> {ns}::error::Result<()>;
}}

"#,
            request = view.request,
            response = view.response,
        )
        .unwrap();
        write!(
            server_stream_traits,
            r#"/// Receives `{request}` messages and sends `{response}` messages.
#[async_trait]
pub trait {stream_server}: Send {{
    fn context(&self) -> &{ns}::context::CallContext;
    async fn recv(&mut self) -> {ns}::error::Result<Option<{request}>>;
    async fn send(&mut self, response: {response}) -> {ns}::error::Result<()>;
    async fn close_send(&mut self) -> {ns}::error::Result<()>;
}}

"#,
            request = view.request,
            response = view.response,
        )
        .unwrap();
        write!(
            caller_methods,
            r#"    async fn {fn_name}(&self, _ctx: &{ns}::context::CallContext) -> {ns}::error::Result<Box<dyn {stream_client}>> {{
        Err({ns}::error::unimplemented("stream wiring for {service_name}.{name}"))
    }}
"#,
            fn_name = view.fn_name,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
        write!(
            handler_methods,
            r#"    async fn {fn_name}(&self, stream: {ns}::transport::ServerStream) -> {ns}::error::Result<()> {{
        self.server.{fn_name}(Box::new({wrapper} {{ stream }})).await
    }}
"#,
            fn_name = view.fn_name,
        )
        .unwrap();
        write!(
            stream_wrappers,
            r#"struct {wrapper} {{
    stream: {ns}::transport::ServerStream,
}}

#[async_trait]
impl {stream_server} for {wrapper} {{
    fn context(&self) -> &{ns}::context::CallContext {{
        self.stream.context()
    }}

    async fn recv(&mut self) -> {ns}::error::Result<Option<{request}>> {{
        Err({ns}::error::unimplemented("stream receive for {service_name}.{name}"))
    }}

    async fn send(&mut self, _response: {response}) -> {ns}::error::Result<()> {{
        Err({ns}::error::unimplemented("stream send for {service_name}.{name}"))
    }}

    async fn close_send(&mut self) -> {ns}::error::Result<()> {{
        Err({ns}::error::unimplemented("stream close for {service_name}.{name}"))
    }}
}}

"#,
            request = view.request,
            response = view.response,
            service_name = service.name,
            name = view.method.name,
        )
        .unwrap();
    }

    for view in &all {
        write!(
            message_ctors,
            r#"pub fn {request_ctor}() -> Box<dyn {ns}::transport::RpcMessage> {{
    Box::new({request}::default())
}}

pub fn {response_ctor}() -> Box<dyn {ns}::transport::RpcMessage> {{
    Box::new({response}::default())
}}

"#,
            request_ctor = naming::request_ctor(service, view.method),
            response_ctor = naming::response_ctor(service, view.method),
            request = view.request,
            response = view.response,
        )
        .unwrap();
    }

    let procedures = render_procedures(service, &server_trait, &handler_struct, &unary, &oneway);

    write!(
        buf,
        r#"
/// Client-side interface for the {service_name} service.
#[async_trait]
pub trait {client_trait}: Send + Sync {{
{client_trait_methods}}}

{client_stream_traits}/// Builds a new RPC client for the {service_name} service.
pub fn {client_builder_fn}(config: {ns}::client::ClientConfig) -> impl {client_trait} {{
    {caller_struct} {{
        client: {ns}::client::Client::new("{routing_name}", config),
    }}
}}

/// Server-side interface for the {service_name} service.
#[async_trait]
pub trait {server_trait}: Send + Sync + 'static {{
{server_trait_methods}}}

{server_stream_traits}{procedures}
struct {caller_struct} {{
    client: {ns}::client::Client,
}}

#[async_trait]
impl {client_trait} for {caller_struct} {{
{caller_methods}}}

struct {handler_struct} {{
    server: Arc<dyn {server_trait}>,
}}

#[allow(dead_code)]
impl {handler_struct} {{
{handler_methods}}}

{stream_wrappers}{message_ctors}/// Registers a builder for {service_name} RPC clients with the supplied registry.
pub fn {register_fn}(registry: &mut {ns}::registry::ClientBuilderRegistry) {{
    registry.register("{routing_name}", |config| {{
        Box::new({caller_struct} {{
            client: {ns}::client::Client::new("{routing_name}", config),
        }}) as Box<dyn {client_trait}>
    }});
}}
"#,
        service_name = service.name,
        routing_name = routing_name,
        client_builder_fn = naming::client_builder_fn(service),
        register_fn = naming::register_client_builder_fn(service),
    )
    .unwrap();

    Ok(())
}

/// Emits the procedure-building function: one registration entry per unary
/// and oneway method, wiring method name, request constructor and handler
/// adapter. Streaming methods have no transport wiring yet and are not
/// registered.
fn render_procedures(
    service: &Service,
    server_trait: &str,
    handler_struct: &str,
    unary: &[MethodView<'_>],
    oneway: &[MethodView<'_>],
) -> String {
    let ns = RUNTIME;
    let procedures_fn = naming::procedures_fn(service);

    if unary.is_empty() && oneway.is_empty() {
        return format!(
            r#"/// Prepares an implementation of the {service_name} service for transport registration.
pub fn {procedures_fn}(_server: Arc<dyn {server_trait}>) -> Vec<{ns}::transport::Procedure> {{
    Vec::new()
}}
"#,
            service_name = service.name,
        );
    }

    let mut entries = String::new();
    for (kind, views) in [("unary", unary), ("oneway", oneway)] {
        for view in views {
            write!(
                entries,
                r#"        {ns}::transport::Procedure::{kind}("{name}", {request_ctor}, {{
            let handler = handler.clone();
            Box::new(move |ctx, request| {{
                let handler = handler.clone();
                Box::pin(async move {{ handler.{fn_name}(ctx, request).await }})
            }})
        }}),
"#,
                name = view.method.name,
                request_ctor = naming::request_ctor(service, view.method),
                fn_name = view.fn_name,
            )
            .unwrap();
        }
    }

    format!(
        r#"/// Prepares an implementation of the {service_name} service for transport registration.
pub fn {procedures_fn}(server: Arc<dyn {server_trait}>) -> Vec<{ns}::transport::Procedure> {{
    let handler = Arc::new({handler_struct} {{ server }});
    vec![
{entries}    ]
}}
"#,
        service_name = service.name,
    )
}

#[cfg(test)]
mod tests {
    use crate::classify::ONEWAY_SENTINEL;
    use crate::runner::default_imports;
    use crate::schema::TypeRef;

    use super::*;

    fn method(name: &str, client_streaming: bool, server_streaming: bool) -> Method {
        Method {
            name: name.to_string(),
            client_streaming,
            server_streaming,
            request_type: TypeRef::new(format!(".pkg.{name}Request")),
            response_type: TypeRef::new(format!(".pkg.{name}Response")),
        }
    }

    fn schema(services: Vec<Service>) -> FileSchema {
        FileSchema {
            name: "pkg.proto".to_string(),
            package: "pkg".to_string(),
            services,
        }
    }

    fn greeter() -> FileSchema {
        schema(vec![Service {
            name: "Greeter".to_string(),
            fqsn: ".pkg.Greeter".to_string(),
            methods: vec![method("Hello", false, false)],
        }])
    }

    fn render(schema: &FileSchema) -> String {
        render_file(schema, &default_imports()).unwrap()
    }

    #[test]
    fn unary_service_gets_client_server_and_registration() {
        let out = render(&greeter());

        assert!(out.contains("// source: pkg.proto"));
        assert!(out.contains("pub trait GreeterRpcClient: Send + Sync {"));
        assert!(out.contains(
            "async fn hello(&self, ctx: &crate::rpc::runtime::context::CallContext, request: HelloRequest) -> crate::rpc::runtime::error::Result<HelloResponse>;"
        ));
        assert!(out.contains("pub trait GreeterRpcServer: Send + Sync + 'static {"));
        assert!(out.contains("pub fn build_greeter_rpc_procedures"));
        assert!(out.contains(r#"Procedure::unary("Hello", new_greeter_hello_rpc_request"#));
        assert!(out.contains("pub fn new_greeter_rpc_client"));
        assert!(out.contains("pub fn register_greeter_rpc_client_builder"));

        // No streaming interfaces for a purely unary service.
        assert!(!out.contains("RpcClientStream"));
        assert!(!out.contains("RpcServerStream"));
        assert!(!out.contains("unimplemented"));
    }

    #[test]
    fn unary_caller_and_handler_check_payload_shapes() {
        let out = render(&greeter());
        assert!(out.contains("downcast::<HelloResponse>()"));
        assert!(out.contains("downcast::<HelloRequest>()"));
        assert!(out.contains("cast_error(&HelloRequest::default(), actual)"));
        assert!(out.contains("cast_error(&HelloResponse::default(), actual)"));
    }

    #[test]
    fn oneway_method_gets_ack_client_and_failure_only_server() {
        let mut m = method("Notify", false, false);
        m.response_type = TypeRef::new(ONEWAY_SENTINEL);
        let out = render(&schema(vec![Service {
            name: "Events".to_string(),
            fqsn: ".pkg.Events".to_string(),
            methods: vec![m],
        }]));

        // Client side returns an abstract acknowledgment, never a typed response.
        assert!(out.contains(
            "async fn notify(&self, ctx: &crate::rpc::runtime::context::CallContext, request: NotifyRequest) -> crate::rpc::runtime::error::Result<crate::rpc::runtime::transport::Ack>;"
        ));
        // Server side returns failure-only.
        assert!(out.contains(
            "async fn notify(&self, ctx: &crate::rpc::runtime::context::CallContext, request: NotifyRequest) -> crate::rpc::runtime::error::Result<()>;"
        ));
        assert!(out.contains(r#"Procedure::oneway("Notify", new_events_notify_rpc_request"#));
        assert!(out.contains(r#"self.client.call_oneway(ctx, "Notify", Box::new(request)).await"#));
        // The oneway marker type still gets its response constructor.
        assert!(out.contains("Box::new(crate::rpc::Oneway::default())"));
    }

    #[test]
    fn bidi_method_yields_exactly_one_stream_interface_pair() {
        let out = render(&schema(vec![Service {
            name: "Chat".to_string(),
            fqsn: ".pkg.Chat".to_string(),
            methods: vec![method("Talk", true, true)],
        }]));

        assert!(out.contains("pub trait ChatServiceTalkRpcClientStream: Send {"));
        assert!(out.contains("pub trait ChatServiceTalkRpcServerStream: Send {"));
        assert_eq!(out.matches("pub trait ChatServiceTalkRpc").count(), 2);

        // Full bidi surface on both sides.
        assert!(out.contains("async fn close_send(&mut self)"));
        assert!(out.contains("async fn send(&mut self, request: TalkRequest)"));
        assert!(out.contains("async fn recv(&mut self)"));

        // Not registered as a procedure, and not callable yet.
        assert!(!out.contains(r#"Procedure::unary("Talk""#));
        assert!(!out.contains(r#"Procedure::oneway("Talk""#));
        assert!(out.contains(r#"unimplemented("stream wiring for Chat.Talk")"#));
        assert!(out.contains("Vec::new()"));
    }

    #[test]
    fn client_streaming_declares_close_and_recv() {
        let out = render(&schema(vec![Service {
            name: "Uploader".to_string(),
            fqsn: ".pkg.Uploader".to_string(),
            methods: vec![method("Upload", true, false)],
        }]));

        assert!(out.contains("async fn close_and_recv(&mut self) -> crate::rpc::runtime::error::Result<UploadResponse>;"));
        // Handler forwards through the wrapper even though wiring is unfinished.
        assert!(out
            .contains("self.server.upload(Box::new(UploaderServiceUploadRpcServerStreamWrapper { stream })).await"));
        assert!(out.contains(r#"unimplemented("stream receive for Uploader.Upload")"#));
    }

    #[test]
    fn server_streaming_server_takes_request_and_stream() {
        let out = render(&schema(vec![Service {
            name: "Monitor".to_string(),
            fqsn: ".pkg.Monitor".to_string(),
            methods: vec![method("Watch", false, true)],
        }]));

        assert!(out.contains(
            "async fn watch(&self, request: WatchRequest, stream: Box<dyn MonitorServiceWatchRpcServerStream>) -> crate::rpc::runtime::error::Result<()>;"
        ));
        // The decoded request is shape-checked before forwarding.
        assert!(out.contains("downcast::<WatchRequest>()"));
        assert!(out.contains(r#"unimplemented("stream send for Monitor.Watch")"#));
    }

    #[test]
    fn constructors_are_emitted_for_every_method() {
        let out = render(&schema(vec![Service {
            name: "Mixed".to_string(),
            fqsn: ".pkg.Mixed".to_string(),
            methods: vec![
                method("One", false, false),
                method("Up", true, false),
                method("Down", false, true),
                method("Both", true, true),
            ],
        }]));

        for m in ["one", "up", "down", "both"] {
            assert!(out.contains(&format!("pub fn new_mixed_{m}_rpc_request()")));
            assert!(out.contains(&format!("pub fn new_mixed_{m}_rpc_response()")));
        }
    }

    #[test]
    fn imports_are_grouped_standard_first() {
        let out = render(&greeter());
        let std_pos = out.find("use std::sync::Arc;").unwrap();
        let ext_pos = out.find("use async_trait::async_trait;").unwrap();
        assert!(std_pos < ext_pos);
    }

    #[test]
    fn file_without_services_is_header_only() {
        let out = render(&schema(vec![]));
        assert!(out.starts_with("// Code generated by rpc_bindgen. DO NOT EDIT.\n"));
        assert!(out.contains("// source: pkg.proto"));
        assert!(!out.contains("use "));
        assert!(!out.contains("trait"));
    }

    #[test]
    fn routing_name_drops_the_leading_dot() {
        let out = render(&greeter());
        assert!(out.contains(r#"Client::new("pkg.Greeter", config)"#));
        assert!(!out.contains(r#"".pkg.Greeter""#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let schema = schema(vec![Service {
            name: "Mixed".to_string(),
            fqsn: ".pkg.Mixed".to_string(),
            methods: vec![
                method("One", false, false),
                method("Up", true, false),
                method("Both", true, true),
            ],
        }]);
        let first = render(&schema);
        let second = render(&schema);
        assert_eq!(first, second);
    }

    #[test]
    fn unresolved_type_identifies_the_method() {
        let mut m = method("Hello", false, false);
        m.response_type = TypeRef::new("");
        let err = render_file(
            &schema(vec![Service {
                name: "Greeter".to_string(),
                fqsn: ".pkg.Greeter".to_string(),
                methods: vec![m],
            }]),
            &default_imports(),
        )
        .unwrap_err();

        match err {
            Error::UnresolvedType {
                service,
                method,
                which,
            } => {
                assert_eq!(service, "Greeter");
                assert_eq!(method, "Hello");
                assert_eq!(which, "response");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cross_package_types_are_spelled_through_the_crate_root() {
        let mut m = method("Fetch", false, false);
        m.request_type = TypeRef::new(".other.FetchRequest");
        let out = render(&schema(vec![Service {
            name: "Fetcher".to_string(),
            fqsn: ".pkg.Fetcher".to_string(),
            methods: vec![m],
        }]));
        assert!(out.contains("request: crate::other::FetchRequest"));
    }
}
