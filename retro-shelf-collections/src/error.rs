/// Errors that can occur while loading, populating or saving collections.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid filter definition: {0}")]
    InvalidFilter(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Collection list could not be read, refusing to overwrite: {}", .0.display())]
    UnreadableList(std::path::PathBuf),
}

impl CollectionError {
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    pub fn unknown_collection(name: impl Into<String>) -> Self {
        Self::UnknownCollection(name.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}
