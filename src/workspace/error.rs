#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read workspace state {path}: {source}")]
    ReadState {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse workspace state {path}: {source}")]
    ParseState {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write workspace state {path}: {source}")]
    WriteState {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "workspace state {path} is corrupt: build configuration `{build}` references unknown project `{project}`"
    )]
    DanglingProjectReference {
        path: String,
        build: String,
        project: String,
    },
}
