use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, trace};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::FormError;
use crate::schema::{normalize_schema, FieldDescriptor, OptionItem};

const PROFILE_SCHEMA: &str = include_str!("../schemas/profile.json");

/// Where a form schema comes from.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> Result<Vec<FieldDescriptor>, FormError>;
}

/// Schema files are either a bare list of fields or `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Bare(Vec<FieldDescriptor>),
    Wrapped { data: Vec<FieldDescriptor> },
}

impl SchemaDocument {
    fn into_fields(self) -> Vec<FieldDescriptor> {
        match self {
            SchemaDocument::Bare(fields) => fields,
            SchemaDocument::Wrapped { data } => data,
        }
    }
}

/// Parse schema text, picking the format from the file extension.
pub fn parse_schema(contents: &str, extension: Option<&str>) -> Result<Vec<FieldDescriptor>, FormError> {
    let document: SchemaDocument = match extension {
        Some("yaml") | Some("yml") => {
            debug!("Parsing schema as YAML");
            serde_yaml::from_str(contents).map_err(|e| FormError::SchemaLoad(e.to_string()))?
        }
        Some("json") => {
            debug!("Parsing schema as JSON");
            serde_json::from_str(contents).map_err(|e| FormError::SchemaLoad(e.to_string()))?
        }
        Some("toml") => {
            debug!("Parsing schema as TOML");
            toml::from_str(contents).map_err(|e| FormError::SchemaLoad(e.to_string()))?
        }
        other => {
            return Err(FormError::SchemaLoad(format!("unsupported schema format {:?}", other)));
        }
    };
    normalize_schema(document.into_fields())
}

pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaSource for FileSchemaSource {
    async fn load(&self) -> Result<Vec<FieldDescriptor>, FormError> {
        debug!("Loading schema from: {:?}", self.path);
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!("Schema file {:?} could not be read: {}", self.path, e);
            FormError::SchemaLoad(format!("{}: {}", self.path.display(), e))
        })?;
        trace!("Schema file content:\n{}", contents);

        parse_schema(&contents, self.path.extension().and_then(|s| s.to_str()))
    }
}

/// A schema held in memory.
pub struct StaticSchemaSource {
    fields: Vec<FieldDescriptor>,
}

impl StaticSchemaSource {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// The built-in profile schema.
    pub fn profile() -> Result<Self, FormError> {
        Ok(Self::new(parse_schema(PROFILE_SCHEMA, Some("json"))?))
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn load(&self) -> Result<Vec<FieldDescriptor>, FormError> {
        normalize_schema(self.fields.clone())
    }
}

/// Resolves a schema source once and serves the same snapshot afterwards.
pub struct SchemaRegistry {
    source: Box<dyn SchemaSource>,
    fields: OnceCell<Arc<[FieldDescriptor]>>,
}

impl SchemaRegistry {
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            fields: OnceCell::new(),
        }
    }

    pub async fn fields(&self) -> Result<Arc<[FieldDescriptor]>, FormError> {
        let fields = self
            .fields
            .get_or_try_init(|| async {
                let fields = self.source.load().await?;
                info!("Form schema loaded with {} fields", fields.len());
                Ok::<_, FormError>(Arc::from(fields))
            })
            .await?;
        Ok(fields.clone())
    }

    pub async fn field(&self, name: &str) -> Result<Option<FieldDescriptor>, FormError> {
        Ok(self.fields().await?.iter().find(|f| f.name == name).cloned())
    }

    /// Options of a field; empty when the field is unknown or has none.
    pub async fn options(&self, name: &str) -> Result<Vec<OptionItem>, FormError> {
        Ok(self.field(name).await?.map(|f| f.options).unwrap_or_default())
    }

    pub async fn default_value(&self, name: &str) -> Result<Option<Value>, FormError> {
        Ok(self.field(name).await?.and_then(|f| f.default_or_none().cloned()))
    }
}
