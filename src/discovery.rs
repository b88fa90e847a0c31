//! Operation discovery for attribute-routed handlers.
//!
//! Finds free functions and `impl` methods carrying a route attribute such as
//! `#[get("/tags/{id}")]` and records what the listing needs to document them:
//! the path, the method, the extracted parameters, the return type and the
//! handler's doc comment.

use crate::catalog::TypeRef;
use crate::docs::DocBlock;
use crate::source::SourceFile;
use log::debug;
use std::fmt;
use syn::visit::Visit;
use syn::{Attribute, Meta};

/// HTTP methods recognised as route attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    fn from_attribute(name: &str) -> Option<Self> {
        match name {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Form,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::Form => "form",
        }
    }
}

/// A documented handler parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub ty: TypeRef,
    pub required: bool,
    /// From the handler's `@param` tags
    pub description: Option<String>,
}

/// A routed handler
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    pub handler: String,
    pub parameters: Vec<Parameter>,
    /// `None` when the handler returns `()`
    pub return_type: Option<TypeRef>,
    pub docs: DocBlock,
}

impl Operation {
    /// The `@returns` override, if any
    pub fn return_override(&self) -> Option<&str> {
        self.docs.tag("returns").filter(|value| !value.is_empty())
    }

    /// `@response <code> <message>` tags as (code, message) pairs; malformed codes are skipped
    pub fn response_messages(&self) -> Vec<(u16, String)> {
        self.docs
            .tag_values("response")
            .filter_map(|value| {
                let (code, message) = value.split_once(char::is_whitespace).unwrap_or((value, ""));
                match code.parse() {
                    Ok(code) => Some((code, message.trim().to_string())),
                    Err(_) => {
                        debug!("Ignoring response tag `{}` on {}", value, self.handler);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Discover every routed handler in the sources, in source order
pub fn discover_operations(files: &[SourceFile]) -> Vec<Operation> {
    let mut visitor = RouteVisitor::default();
    for file in files {
        visitor.visit_file(&file.syntax);
    }
    debug!("Discovered {} operations", visitor.operations.len());
    visitor.operations
}

#[derive(Default)]
struct RouteVisitor {
    operations: Vec<Operation>,
}

impl RouteVisitor {
    fn add_handler(&mut self, attrs: &[Attribute], sig: &syn::Signature) {
        for attr in attrs {
            let Some((method, path)) = parse_route_attribute(attr) else {
                continue;
            };
            let handler = sig.ident.to_string();
            debug!("Found route {} {} -> {}", method, path, handler);

            let docs = DocBlock::from_attrs(attrs);
            let mut parameters = extract_parameters(&path, sig);
            for parameter in &mut parameters {
                parameter.description = param_description(&docs, &parameter.name);
            }

            let return_type = match &sig.output {
                syn::ReturnType::Default => None,
                syn::ReturnType::Type(_, ty) => Some(TypeRef::from_syn(ty)).filter(|ty| !ty.is_unit()),
            };

            self.operations.push(Operation {
                path,
                method,
                handler,
                parameters,
                return_type,
                docs,
            });
        }
    }
}

impl<'ast> Visit<'ast> for RouteVisitor {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.add_handler(&node.attrs, &node.sig);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.add_handler(&node.attrs, &node.sig);
    }
}

/// Parse `#[get("/path")]`, `#[actix_web::post("/path", wrap = "...")]` and friends
fn parse_route_attribute(attr: &Attribute) -> Option<(HttpMethod, String)> {
    let name = attr.path().segments.last()?.ident.to_string();
    let method = HttpMethod::from_attribute(&name)?;

    let Meta::List(list) = &attr.meta else {
        return None;
    };
    let path = list
        .parse_args_with(|input: syn::parse::ParseStream| {
            let path: syn::LitStr = input.parse()?;
            // Remaining arguments (guards, wrappers) don't affect the documentation
            input.step(|cursor| {
                let mut rest = *cursor;
                while let Some((_, next)) = rest.token_tree() {
                    rest = next;
                }
                Ok(((), rest))
            })?;
            Ok(path.value())
        })
        .ok()?;

    Some((method, path))
}

/// Names of the `{name}` segments of a route template, in order
fn template_names(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| name.split(':').next().unwrap_or(name).to_string())
        .collect()
}

fn extract_parameters(path: &str, sig: &syn::Signature) -> Vec<Parameter> {
    let templates = template_names(path);
    let mut parameters = Vec::new();
    let mut bound_templates = false;

    for input in &sig.inputs {
        let syn::FnArg::Typed(pat_type) = input else {
            continue;
        };
        let ty = TypeRef::from_syn(&pat_type.ty);
        let (extractor, inner) = match &ty {
            TypeRef::Named { name, args } if args.len() == 1 => (name.as_str(), &args[0]),
            _ => continue,
        };
        let bindings = binding_names(&pat_type.pat);
        let binding = bindings.first().cloned().unwrap_or_else(|| "value".to_string());

        match extractor {
            "Path" => {
                bound_templates = true;
                match inner {
                    TypeRef::Tuple(elems) => {
                        for (i, elem) in elems.iter().enumerate() {
                            let name = templates
                                .get(i)
                                .or_else(|| bindings.get(i))
                                .cloned()
                                .unwrap_or_else(|| format!("param{}", i));
                            parameters.push(Parameter::required(name, ParameterLocation::Path, elem.clone()));
                        }
                    }
                    _ => {
                        let name = match templates.as_slice() {
                            [single] => single.clone(),
                            _ => binding,
                        };
                        parameters.push(Parameter::required(name, ParameterLocation::Path, inner.clone()));
                    }
                }
            }
            "Query" => {
                let required = inner.name() != Some("Option");
                parameters.push(Parameter {
                    required,
                    ..Parameter::required(binding, ParameterLocation::Query, inner.clone())
                });
            }
            "Json" => parameters.push(Parameter::required(
                "body".to_string(),
                ParameterLocation::Body,
                inner.clone(),
            )),
            "Form" => parameters.push(Parameter::required(binding, ParameterLocation::Form, inner.clone())),
            _ => {}
        }
    }

    // Templates without a Path extractor are documented as strings
    if !bound_templates {
        for name in templates {
            parameters.push(Parameter::required(name, ParameterLocation::Path, TypeRef::named("String")));
        }
    }

    parameters
}

impl Parameter {
    fn required(name: String, location: ParameterLocation, ty: TypeRef) -> Self {
        Self {
            name,
            location,
            ty,
            required: true,
            description: None,
        }
    }
}

/// Identifiers bound by an argument pattern, e.g. `Path((a, b))` -> `[a, b]`
fn binding_names(pat: &syn::Pat) -> Vec<String> {
    match pat {
        syn::Pat::Ident(ident) => vec![ident.ident.to_string()],
        syn::Pat::TupleStruct(tuple) => tuple.elems.iter().flat_map(binding_names).collect(),
        syn::Pat::Tuple(tuple) => tuple.elems.iter().flat_map(binding_names).collect(),
        syn::Pat::Paren(paren) => binding_names(&paren.pat),
        syn::Pat::Type(typed) => binding_names(&typed.pat),
        _ => Vec::new(),
    }
}

fn param_description(docs: &DocBlock, name: &str) -> Option<String> {
    docs.tag_values("param").find_map(|value| {
        let (param, text) = value.split_once(char::is_whitespace)?;
        (param == name).then(|| text.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn discover(code: &str) -> Vec<Operation> {
        let file = SourceFile::from_source("test.rs", code).unwrap();
        discover_operations(&[file])
    }

    #[test]
    fn test_simple_get_route() {
        let ops = discover(
            r#"
            use actix_web::{get, HttpResponse};

            #[get("/hello")]
            async fn hello() -> HttpResponse {
                HttpResponse::Ok().body("Hello, World!")
            }
        "#,
        );

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].path, "/hello");
        assert_eq!(ops[0].method, HttpMethod::Get);
        assert_eq!(ops[0].handler, "hello");
        assert_eq!(ops[0].return_type, Some(TypeRef::named("HttpResponse")));
    }

    #[test]
    fn test_all_methods_and_qualified_attributes() {
        let ops = discover(
            r#"
            #[actix_web::get("/r")] async fn a() {}
            #[post("/r")] async fn b() {}
            #[put("/r")] async fn c() {}
            #[delete("/r")] async fn d() {}
            #[patch("/r")] async fn e() {}
            #[head("/r")] async fn f() {}
            #[options("/r")] async fn g() {}
            #[derive(Debug)] struct NotARoute;
            #[test] fn not_a_route() {}
        "#,
        );

        let methods: Vec<&str> = ops.iter().map(|o| o.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"]);
        assert!(ops.iter().all(|o| o.return_type.is_none()));
    }

    #[test]
    fn test_route_with_extra_arguments() {
        let ops = discover(r#"#[get("/guarded", wrap = "Auth", guard = "is_admin")] async fn guarded() {}"#);
        assert_eq!(ops[0].path, "/guarded");
    }

    #[test]
    fn test_tuple_path_parameters_follow_template() {
        let ops = discover(
            r#"
            #[get("/posts/{post_id}/comments/{comment_id}")]
            async fn get_comment(path: web::Path<(u32, String)>) -> Json<Comment> { todo!() }
        "#,
        );

        let params = &ops[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "post_id");
        assert_eq!(params[0].ty, TypeRef::named("u32"));
        assert_eq!(params[1].name, "comment_id");
        assert!(params.iter().all(|p| p.location == ParameterLocation::Path && p.required));
    }

    #[test]
    fn test_single_path_value_takes_template_name() {
        let ops = discover(
            r#"
            #[get("/tags/{id}")]
            async fn get_tag(tag_id: Path<i64>) -> Json<Tag> { todo!() }
        "#,
        );
        assert_eq!(ops[0].parameters[0].name, "id");
        assert_eq!(ops[0].parameters[0].ty, TypeRef::named("i64"));
    }

    #[test]
    fn test_unbound_templates_are_strings() {
        let ops = discover(r#"#[get("/users/{id}")] async fn get_user() -> HttpResponse { todo!() }"#);
        assert_eq!(ops[0].parameters.len(), 1);
        assert_eq!(ops[0].parameters[0].name, "id");
        assert_eq!(ops[0].parameters[0].ty, TypeRef::named("String"));
    }

    #[test]
    fn test_query_body_and_form() {
        let ops = discover(
            r#"
            #[post("/tags")]
            async fn create(
                state: web::Data<AppState>,
                filter: Query<Option<TagFilter>>,
                web::Json(tag): web::Json<NewTag>,
                upload: Form<Upload>,
                req: HttpRequest,
            ) -> Result<Json<Tag>, Error> { todo!() }
        "#,
        );

        let params = &ops[0].parameters;
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].location, ParameterLocation::Query);
        assert_eq!(params[0].name, "filter");
        assert!(!params[0].required);
        assert_eq!(params[1].location, ParameterLocation::Body);
        assert_eq!(params[1].ty, TypeRef::named("NewTag"));
        assert_eq!(params[2].location, ParameterLocation::Form);
        assert_eq!(ops[0].return_type, Some(TypeRef::parse("Result<Json<Tag>, Error>").unwrap()));
    }

    #[test]
    fn test_impl_methods_and_doc_tags() {
        let ops = discover(
            r#"
            impl TagController {
                /// Get a tag
                ///
                /// Reads from the cache first.
                ///
                /// @param id Identifier of the tag
                /// @response 404 Tag not found
                /// @response abc Not a code
                /// @returns Metadata<Tag>
                #[get("/tags/{id}")]
                pub async fn get(&self, id: Path<u64>) -> HttpResponse { todo!() }

                fn helper(&self) {}
            }
        "#,
        );

        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.docs.summary.as_deref(), Some("Get a tag"));
        assert_eq!(op.docs.remarks.as_deref(), Some("Reads from the cache first."));
        assert_eq!(op.parameters[0].description.as_deref(), Some("Identifier of the tag"));
        assert_eq!(op.return_override(), Some("Metadata<Tag>"));
        assert_eq!(op.response_messages(), vec![(404, "Tag not found".to_string())]);
    }

    #[test]
    fn test_template_names_strip_patterns() {
        assert_eq!(template_names("/files/{name:.*}/v/{id}"), vec!["name", "id"]);
        assert!(template_names("/plain").is_empty());
    }
}
