use std::path::PathBuf;

use thiserror::Error;

/// The survey file could not be read in any supported format.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read survey data ({} attempt(s)): {}", .attempts.len(), describe(.attempts))]
    Unreadable { attempts: Vec<(PathBuf, String)> },
}

fn describe(attempts: &[(PathBuf, String)]) -> String {
    attempts
        .iter()
        .map(|(path, err)| format!("{}: {err}", path.display()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a metric has no value. This is the "no data" sentinel of every metric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricUnavailable {
    #[error("no records")]
    EmptySubset,
    #[error("column '{0}' is missing")]
    MissingColumn(String),
    #[error("column '{0}' has no usable values")]
    NoValues(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_lists_every_attempt() {
        let err = LoadError::Unreadable {
            attempts: vec![
                (PathBuf::from("data.parquet"), "not found".into()),
                (PathBuf::from("data.csv"), "bad header".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 attempt(s)"));
        assert!(msg.contains("data.parquet: not found"));
        assert!(msg.contains("data.csv: bad header"));
    }
}
