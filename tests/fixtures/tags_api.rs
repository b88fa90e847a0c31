use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use crate::models::{Metadata, PagedMetadata, Tag, TagFilter, TagType};

/// List tags
///
/// Results are ordered by name.
///
/// @param filter Optional name and type filter
#[get("/api/Tags")]
async fn list_tags(filter: web::Query<TagFilter>) -> web::Json<PagedMetadata<Tag>> {
    todo!()
}

/// Get a tag by id
///
/// @param id Identifier of the tag
/// @response 404 Tag not found
/// @returns Metadata<Tag>
#[get("/api/Tags/{id}")]
async fn get_tag(id: web::Path<i64>) -> HttpResponse {
    todo!()
}

/// Create a tag
///
/// @response 400 Invalid tag
#[post("/api/Tags")]
async fn create_tag(tag: web::Json<Tag>) -> Result<web::Json<Metadata<Tag>>, actix_web::Error> {
    todo!()
}

/// Replace a tag
#[put("/api/Tags/{id}")]
async fn update_tag(path: web::Path<i64>, tag: web::Json<Tag>) -> impl Responder {
    HttpResponse::Ok()
}

/// Delete a tag
#[delete("/api/Tags/{id}")]
async fn delete_tag(id: web::Path<i64>) {}

/// Tags of one type
#[get("/api/Tags/types/{tag_type}")]
async fn tags_by_type(tag_type: web::Path<TagType>) -> web::Json<Metadata<Vec<Tag>>> {
    todo!()
}

/// Broken documentation
///
/// @returns Metadata<DoesNotExist>
#[get("/api/broken")]
async fn broken() -> HttpResponse {
    todo!()
}
