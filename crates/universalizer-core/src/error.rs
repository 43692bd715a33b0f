use std::path::PathBuf;
use universalizer_prefixes::PrefixError;

#[derive(Debug, thiserror::Error)]
pub enum UniversalizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Prefix(#[from] PrefixError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrong number of node/edge tables; raised before anything is opened for writing.
    #[error("graph files in {}: {message}", .dir.display())]
    GraphFiles { dir: PathBuf, message: String },

    #[error("mapping file {}: {message}", .path.display())]
    MappingFile { path: PathBuf, message: String },

    #[error("namespace map {}: {message}", .path.display())]
    NamespaceMap { path: PathBuf, message: String },

    #[error("oracle directory {} does not exist", .0.display())]
    OracleDir(PathBuf),

    /// The node/edge rewrite failed; neither original table was replaced.
    #[error("rewrite of {} and {} failed: {source}", .nodes.display(), .edges.display())]
    Rewrite {
        nodes: PathBuf,
        edges: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, UniversalizerError>;
