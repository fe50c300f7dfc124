//! Edge list snapshots
//!
//! Two input formats are accepted:
//!
//! - a JSON list of `[u, v]` pairs, e.g. `[[1, 2], [2, 3]]`
//! - plain text with one `u v` or `u,v` pair per line, where lines starting
//!   with the comment marker (`#` by default) and blank lines are skipped
//!
//! Output is always JSON.

use crate::model::Edge;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdgeListError {
    #[error("failed to access edge list: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON edge list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: expected two node ids, got {content:?}")]
    Parse { line: usize, content: String },
}

/// Reader for text or JSON edge lists.
#[derive(Debug, Clone)]
pub struct EdgeListReader {
    comment_marker: String,
}

impl Default for EdgeListReader {
    fn default() -> Self {
        Self {
            comment_marker: "#".to_string(),
        }
    }
}

impl EdgeListReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines starting with `marker` are skipped in the text format.
    pub fn comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }

    pub fn parse(&self, data: &str) -> Result<Vec<Edge>, EdgeListError> {
        let trimmed = data.trim_start();
        if trimmed.starts_with('[') {
            return Ok(serde_json::from_str(trimmed)?);
        }

        let mut edges = Vec::new();
        for (i, raw) in data.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(&self.comment_marker) {
                continue;
            }
            edges.push(parse_pair(line).ok_or_else(|| EdgeListError::Parse {
                line: i + 1,
                content: line.to_string(),
            })?);
        }
        Ok(edges)
    }

    pub fn read(&self, path: &Path) -> Result<Vec<Edge>, EdgeListError> {
        let data = std::fs::read_to_string(path)?;
        let edges = self.parse(&data)?;
        tracing::debug!("Loaded {} edges from {}", edges.len(), path.display());
        Ok(edges)
    }
}

fn parse_pair(line: &str) -> Option<Edge> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let source = parts.next()?.parse::<u64>().ok()?;
    let target = parts.next()?.parse::<u64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Edge::new(source, target))
}

/// Parse an edge list with the default reader.
pub fn parse_edge_list(data: &str) -> Result<Vec<Edge>, EdgeListError> {
    EdgeListReader::default().parse(data)
}

pub fn read_edge_list(path: &Path) -> Result<Vec<Edge>, EdgeListError> {
    EdgeListReader::default().read(path)
}

/// Write edges as a JSON list of `[u, v]` pairs.
pub fn write_edge_list(path: &Path, edges: &[Edge]) -> Result<(), EdgeListError> {
    let json = serde_json::to_string(edges)?;
    std::fs::write(path, json)?;
    tracing::debug!("Saved {} edges to {}", edges.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edges_from_pairs;

    #[test]
    fn parses_whitespace_and_comma_lines() {
        let data = "# triangle\n1 2\n2,3\n\n 3 \t 1 \n";
        assert_eq!(
            parse_edge_list(data).unwrap(),
            edges_from_pairs([(1, 2), (2, 3), (3, 1)])
        );
    }

    #[test]
    fn parses_json_pairs() {
        let data = "  [[1, 2], [2, 3]]";
        assert_eq!(
            parse_edge_list(data).unwrap(),
            edges_from_pairs([(1, 2), (2, 3)])
        );
    }

    #[test]
    fn reports_bad_line() {
        let err = parse_edge_list("1 2\n3\n").unwrap_err();
        match err {
            EdgeListError::Parse { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "3");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_edge_list("1 2 3").is_err());
        assert!(parse_edge_list("1 -2").is_err());
    }

    #[test]
    fn custom_comment_marker() {
        let reader = EdgeListReader::new().comment_marker("c");
        assert_eq!(
            reader.parse("c header\n4 5\n").unwrap(),
            edges_from_pairs([(4, 5)])
        );
    }
}
