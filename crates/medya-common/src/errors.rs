use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("unknown tab: {0}")]
    UnknownTab(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("navigation to {url} blocked: origin not allowed for {source_name}")]
    NavigationBlocked { source_name: String, url: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("renderer for tab {0} already terminated")]
    Terminated(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MedyaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Tab(#[from] TabError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
