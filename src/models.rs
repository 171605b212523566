use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer};

/// Namespace Docker Hub uses for official images.
pub const DEFAULT_NAMESPACE: &str = "library";

/// How a platform's architecture is compared against the requested one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArchMatch {
    /// Architecture must equal the requested value
    #[default]
    Exact,
    /// Requested value is a regular expression searched in the architecture
    Regex,
}

/// Everything the resolver needs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub repository: String,
    pub architecture: String,
    pub operating_system: String,
    pub tag_pattern: String,
    pub arch_match: ArchMatch,
}

impl RequestParams {
    pub fn new(
        repository: &str,
        architecture: &str,
        operating_system: &str,
        tag_pattern: &str,
    ) -> Self {
        Self {
            repository: normalize_repository(repository),
            architecture: architecture.to_string(),
            operating_system: operating_system.to_string(),
            tag_pattern: tag_pattern.to_string(),
            arch_match: ArchMatch::default(),
        }
    }

    pub fn with_arch_match(mut self, arch_match: ArchMatch) -> Self {
        self.arch_match = arch_match;
        self
    }
}

/// Prepend the `library/` namespace to bare official image names.
pub fn normalize_repository(repository: &str) -> String {
    if repository.contains('/') {
        repository.to_string()
    } else {
        format!("{}/{}", DEFAULT_NAMESPACE, repository)
    }
}

/// GET /v2/repositories/<namespace>/<repo>/tags response
#[derive(Debug, Deserialize)]
pub struct TagPage {
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<TagSummary>,
}

impl TagPage {
    /// The next page URL, if the registry announced one
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagSummary {
    pub name: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<PlatformDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ContentType {
    Image,
    Plugin,
    Other(String),
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image" => ContentType::Image,
            "plugin" => ContentType::Plugin,
            _ => ContentType::Other(value),
        }
    }
}

/// One build variant of a tag
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub architecture: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    Active,
    Inactive,
    #[default]
    Unknown,
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Status::Active,
            "inactive" => Status::Inactive,
            _ => Status::Unknown,
        }
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tag that survived the filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub last_updated: Option<String>,
}

impl From<&TagSummary> for Candidate {
    fn from(tag: &TagSummary) -> Self {
        Self {
            name: tag.name.clone(),
            last_updated: tag.last_updated.clone(),
        }
    }
}

/// The winning tag of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub repository: String,
    pub tag: String,
    pub last_updated: Option<String>,
}

impl SelectionResult {
    /// Parse the registry timestamp; Docker Hub sends RFC 3339 with nanoseconds.
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_updated.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// `repository:tag` reference printed on stdout
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}
