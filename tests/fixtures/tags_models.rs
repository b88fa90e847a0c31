use serde::{Deserialize, Serialize};

/// A label attached to content
#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    /// @required
    pub id: i64,
    /// Display name
    /// @required
    pub name: String,
    /// Kind of tag
    #[serde(rename = "tagType")]
    pub tag_type: TagType,
    /// Ratings given to this tag
    pub ratings: Vec<Rating>,
    /// Parent tag, if any
    pub parent: Option<Box<Tag>>,
    #[serde(skip)]
    pub cache_key: String,
}

/// A user's rating of a tag
#[derive(Debug, Serialize, Deserialize)]
pub struct Rating {
    /// Score between 1 and 5
    /// @required
    pub score: u8,
    /// The rated tag
    pub tag: Tag,
}

/// Kind of tag
#[derive(Debug, Serialize, Deserialize)]
pub enum TagType {
    Normal,
    Complex,
    NotDefined,
}

/// Response envelope
#[derive(Debug, Serialize)]
pub struct Metadata<T> {
    pub content: T,
    pub meta: MetaBase,
}

/// Envelope for paged results
#[derive(Debug, Serialize)]
pub struct PagedMetadata<T> {
    pub content: Vec<T>,
    pub meta: MetaBase,
    pub page: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct MetaBase {
    /// HTTP status code of the response
    pub http_code: u16,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct TagFilter {
    pub name: Option<String>,
    pub tag_type: Option<TagType>,
}
