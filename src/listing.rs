use crate::catalog::TypeCatalog;
use crate::config::GeneratorConfig;
use crate::discovery::{discover_operations, HttpMethod, Operation, Parameter, ParameterLocation};
use crate::docs::DocComments;
use crate::error::{Error, Result};
use crate::model::{ItemRef, ModelDescriptor, SchemaType};
use crate::schema_builder::SchemaBuilder;
use crate::source::SourceFile;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

pub const SWAGGER_VERSION: &str = "1.2";
const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// The generated documentation: every documented path plus the models they reach
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListing {
    pub api_version: String,
    pub swagger_version: String,
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    pub produces: Vec<String>,
    pub apis: Vec<ApiDescription>,
    pub models: BTreeMap<String, ModelDescriptor>,
}

/// All operations of one path
#[derive(Debug, Clone, Serialize)]
pub struct ApiDescription {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operations: Vec<OperationDoc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDoc {
    pub http_method: String,
    pub nickname: String,
    /// Response schema name
    #[serde(rename = "type")]
    pub response_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub parameters: Vec<ParameterDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_messages: Vec<ResponseMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDoc {
    pub param_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemRef>,
    pub required: bool,
    pub allow_multiple: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMessage {
    pub code: u16,
    pub message: String,
}

/// Resource listing builder
pub struct ListingBuilder {
    api_version: String,
    base_path: String,
    resource_path: Option<String>,
    lowercase_routes: bool,
    ignore_route_query_parameters: bool,
    apis: Vec<ApiDescription>,
}

impl ListingBuilder {
    pub fn new(config: &GeneratorConfig) -> Self {
        debug!("Initializing ListingBuilder");
        Self {
            api_version: config.api_version.clone(),
            base_path: config.base_path.clone(),
            resource_path: config.resource_path.clone(),
            lowercase_routes: config.lowercase_routes,
            ignore_route_query_parameters: config.ignore_route_query_parameters,
            apis: Vec::new(),
        }
    }

    /// Apply the configured route normalisation
    pub fn route_path(&self, path: &str) -> String {
        let path = if self.ignore_route_query_parameters {
            path.split('?').next().unwrap_or(path)
        } else {
            path
        };
        if self.lowercase_routes {
            path.to_lowercase()
        } else {
            path.to_string()
        }
    }

    /// Document one operation.
    ///
    /// On error nothing is added; models registered before the failure stay
    /// in the builder's registry.
    pub fn add_operation(&mut self, operation: &Operation, schemas: &SchemaBuilder) -> Result<()> {
        debug!("Adding operation: {} {}", operation.method, operation.path);

        let response = match operation.return_override() {
            Some(input) => schemas.response_type_override(input)?,
            None => schemas.response_type(operation.return_type.as_ref())?,
        };

        let parameters = operation
            .parameters
            .iter()
            .map(|p| Self::parameter_doc(p, schemas))
            .collect::<Result<Vec<_>>>()?;

        let consumes = if operation
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Form)
        {
            vec![FORM.to_string()]
        } else if operation
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Body)
        {
            vec![JSON.to_string()]
        } else {
            Vec::new()
        };

        let doc = OperationDoc {
            http_method: operation.method.as_str().to_string(),
            nickname: operation.handler.clone(),
            response_type: response.name().to_string(),
            format: response.format().map(str::to_string),
            items: response.items().cloned(),
            summary: operation.docs.summary.clone(),
            notes: operation.docs.remarks.clone(),
            parameters,
            response_messages: operation
                .response_messages()
                .into_iter()
                .map(|(code, message)| ResponseMessage { code, message })
                .collect(),
            consumes,
        };

        let path = self.route_path(&operation.path);
        match self.apis.iter_mut().find(|api| api.path == path) {
            Some(api) => api.operations.push(doc),
            None => self.apis.push(ApiDescription {
                path,
                description: None,
                operations: vec![doc],
            }),
        }
        Ok(())
    }

    fn parameter_doc(parameter: &Parameter, schemas: &SchemaBuilder) -> Result<ParameterDoc> {
        let schema: SchemaType = schemas.parameter_type(&parameter.ty)?;
        Ok(ParameterDoc {
            param_type: parameter.location.as_str().to_string(),
            name: parameter.name.clone(),
            description: parameter.description.clone(),
            data_type: schema.name().to_string(),
            format: schema.format().map(str::to_string),
            items: schema.items().cloned(),
            required: parameter.required,
            allow_multiple: schema.is_array() && parameter.location == ParameterLocation::Query,
            enum_values: schemas.enum_values(&parameter.ty),
        })
    }

    pub fn operation_count(&self) -> usize {
        self.apis.iter().map(|api| api.operations.len()).sum()
    }

    /// Finish the listing with every model registered in `schemas`
    pub fn build(self, schemas: &SchemaBuilder) -> ResourceListing {
        ResourceListing {
            api_version: self.api_version,
            swagger_version: SWAGGER_VERSION.to_string(),
            base_path: self.base_path,
            resource_path: self.resource_path,
            produces: vec![JSON.to_string()],
            apis: self.apis,
            models: schemas.models(),
        }
    }
}

/// An operation left out of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    pub method: HttpMethod,
    pub path: String,
    pub handler: String,
    pub error: Error,
}

/// Outcome of a generation run
#[derive(Debug, Clone)]
pub struct Generated {
    pub listing: ResourceListing,
    /// Operations found in the sources
    pub discovered: usize,
    /// Operations present in the listing
    pub documented: usize,
    pub failures: Vec<OperationFailure>,
}

/// Document every routed handler in `files`.
///
/// A failing operation is logged and skipped; the remaining ones are still documented.
pub fn generate_listing(files: &[SourceFile], config: &GeneratorConfig) -> Generated {
    let operations = discover_operations(files);
    let schemas = SchemaBuilder::new(
        TypeCatalog::from_sources(files),
        config.clone(),
        Box::new(DocComments::from_sources(files)),
    );

    let mut builder = ListingBuilder::new(config);
    let mut failures = Vec::new();
    for operation in &operations {
        if let Err(error) = builder.add_operation(operation, &schemas) {
            warn!(
                "Skipping {} {} ({}): {}",
                operation.method, operation.path, operation.handler, error
            );
            failures.push(OperationFailure {
                method: operation.method,
                path: operation.path.clone(),
                handler: operation.handler.clone(),
                error,
            });
        }
    }

    Generated {
        documented: builder.operation_count(),
        listing: builder.build(&schemas),
        discovered: operations.len(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CODE: &str = r#"
        /// A tag
        pub struct Tag { pub name: String, pub kind: TagType }
        pub enum TagType { Normal, Complex }
        pub struct Metadata<T> { pub content: T }

        /// List tags
        #[get("/Tags?page={page}")]
        async fn list_tags() -> Json<Vec<Tag>> { todo!() }

        /// Get a tag
        ///
        /// @response 404 Not found
        /// @returns Metadata<Tag>
        #[get("/Tags/{id}")]
        async fn get_tag(id: Path<u64>) -> HttpResponse { todo!() }

        #[delete("/Tags/{id}")]
        async fn delete_tag(id: Path<u64>) {}

        #[post("/Tags")]
        async fn create_tag(tag: Json<Tag>, kind: Query<TagType>) -> Json<Tag> { todo!() }

        /// @returns Missing
        #[get("/broken")]
        async fn broken() -> HttpResponse { todo!() }
    "#;

    fn setup(config: GeneratorConfig) -> (Vec<Operation>, SchemaBuilder) {
        let file = SourceFile::from_source("api.rs", CODE).unwrap();
        let files = [file];
        let operations = discover_operations(&files);
        let schemas = SchemaBuilder::new(
            TypeCatalog::from_sources(&files),
            config,
            Box::new(DocComments::from_sources(&files)),
        );
        (operations, schemas)
    }

    fn build(config: GeneratorConfig) -> (ResourceListing, Vec<Error>) {
        let (operations, schemas) = setup(config.clone());
        let mut builder = ListingBuilder::new(&config);
        let errors = operations
            .iter()
            .filter_map(|op| builder.add_operation(op, &schemas).err())
            .collect();
        (builder.build(&schemas), errors)
    }

    #[test]
    fn test_operations_grouped_by_path() {
        let (listing, errors) = build(GeneratorConfig::default());
        assert_eq!(
            errors,
            vec![Error::UnresolvedType {
                input: "Missing".to_string()
            }]
        );

        let paths: Vec<&str> = listing.apis.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["/Tags?page={page}", "/Tags/{id}", "/Tags"]);
        let methods: Vec<&str> = listing.apis[1]
            .operations
            .iter()
            .map(|o| o.http_method.as_str())
            .collect();
        assert_eq!(methods, vec!["GET", "DELETE"]);
    }

    #[test]
    fn test_route_normalisation() {
        let config = GeneratorConfig {
            lowercase_routes: true,
            ignore_route_query_parameters: true,
            ..GeneratorConfig::default()
        };
        let (listing, _) = build(config);
        let paths: Vec<&str> = listing.apis.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["/tags", "/tags/{id}"]);
        assert_eq!(listing.apis[0].operations.len(), 2);
    }

    #[test]
    fn test_response_types_and_overrides() {
        let (listing, _) = build(GeneratorConfig::default());

        let list = &listing.apis[0].operations[0];
        assert_eq!(list.response_type, "array");
        assert_eq!(list.items, Some(ItemRef::model("tag")));
        assert_eq!(list.summary.as_deref(), Some("List tags"));

        let get = &listing.apis[1].operations[0];
        assert_eq!(get.response_type, "metadata<tag>");
        assert_eq!(
            get.response_messages,
            vec![ResponseMessage {
                code: 404,
                message: "Not found".to_string()
            }]
        );

        let delete = &listing.apis[1].operations[1];
        assert_eq!(delete.response_type, "void");

        assert_eq!(
            listing.models.keys().collect::<Vec<_>>(),
            vec!["metadata<tag>", "tag", "tagtype"]
        );
    }

    #[test]
    fn test_parameters() {
        let (listing, _) = build(GeneratorConfig::default());

        let get = &listing.apis[1].operations[0];
        assert_eq!(get.parameters[0].name, "id");
        assert_eq!(get.parameters[0].data_type, "integer");
        assert_eq!(get.parameters[0].format.as_deref(), Some("int64"));

        let create = &listing.apis[2].operations[0];
        assert_eq!(create.consumes, vec![JSON.to_string()]);
        assert_eq!(create.parameters[0].param_type, "body");
        assert_eq!(create.parameters[0].data_type, "tag");
        assert_eq!(create.parameters[1].param_type, "query");
        assert_eq!(
            create.parameters[1].enum_values,
            Some(vec!["Normal".to_string(), "Complex".to_string()])
        );
    }

    #[test]
    fn test_listing_serialization_shape() {
        let (listing, _) = build(GeneratorConfig::default());
        let value = serde_json::to_value(&listing).unwrap();

        assert_eq!(value["swaggerVersion"], json!("1.2"));
        assert_eq!(value["apiVersion"], json!("1.0.0"));
        assert_eq!(value["basePath"], json!("http://localhost"));
        assert!(value.get("resourcePath").is_none());
        assert_eq!(
            value["apis"][1]["operations"][0]["responseMessages"],
            json!([{ "code": 404, "message": "Not found" }])
        );
        assert_eq!(
            value["apis"][0]["operations"][0]["items"],
            json!({ "$ref": "tag" })
        );
        assert_eq!(value["models"]["tag"]["description"], json!("A tag"));
        assert_eq!(value["models"]["tagtype"]["values"], json!(["Normal", "Complex"]));
    }

    #[test]
    fn test_generate_listing_reports_failures() {
        let file = SourceFile::from_source("api.rs", CODE).unwrap();
        let generated = generate_listing(&[file], &GeneratorConfig::default());

        assert_eq!(generated.discovered, 5);
        assert_eq!(generated.failures.len(), 1);
        assert_eq!(generated.failures[0].handler, "broken");
        assert_eq!(generated.failures[0].method, HttpMethod::Get);
        assert_eq!(generated.documented, 4);
        let in_listing: usize = generated.listing.apis.iter().map(|a| a.operations.len()).sum();
        assert_eq!(in_listing, 4);
    }
}
