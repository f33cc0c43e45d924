use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IvyError {
    #[error("Record not found: {table}/{id}")]
    NotFound { table: String, id: String },

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Malformed record {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {} has no \"tags\" string array", .path.display())]
    MissingTags { path: PathBuf },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table {0} has no tag index")]
    NotIndexed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IvyError {
    /// True for every failure to read a record file as the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(self, IvyError::Decode { .. } | IvyError::MissingTags { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, IvyError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, IvyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_table_and_id() {
        let err = IvyError::NotFound {
            table: "planes".to_string(),
            id: "7".to_string(),
        };
        assert_eq!(err.to_string(), "Record not found: planes/7");
        assert!(err.is_not_found());
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_kinds() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode = IvyError::Decode {
            path: PathBuf::from("planes/1.json"),
            source,
        };
        let missing = IvyError::MissingTags {
            path: PathBuf::from("planes/2.json"),
        };
        assert!(decode.is_decode());
        assert!(missing.is_decode());
        assert!(missing.to_string().contains("planes/2.json"));
    }

    #[test]
    fn test_io_passthrough() {
        let err: IvyError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, IvyError::Io(_)));
    }
}
