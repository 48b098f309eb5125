//! CSV edge list parsing.
//!
//! The kernel takes pre-parsed rows; this is the boundary that turns an
//! uploaded `user1,user2` file into those rows.

use csv::{ReaderBuilder, Trim};

use super::LoadError;

/// Parse CSV bytes into rows of fields.
///
/// When `has_header` is set the first record is treated as a header and
/// dropped. Records may have any number of fields; short ones are left for
/// the loader to skip.
pub fn parse_edge_csv(input: &[u8], has_header: bool) -> Result<Vec<Vec<String>>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{build, IngestLimits};
    use crate::store::GraphStore;

    #[test]
    fn test_header_skipped() {
        let input = b"user1,user2\nAda,Grace\nGrace,Alan\n";
        let rows = parse_edge_csv(input, true).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Ada", "Grace"]);
    }

    #[test]
    fn test_without_header() {
        let input = b"Ada,Grace\n";
        let rows = parse_edge_csv(input, false).unwrap();
        assert_eq!(rows, vec![vec!["Ada".to_string(), "Grace".to_string()]]);
    }

    #[test]
    fn test_ragged_rows_reach_loader() {
        let input = b"user1,user2\nAda\nAda , Grace ,extra\n\"Lovelace, Ada\",Babbage\n";
        let rows = parse_edge_csv(input, true).unwrap();
        assert_eq!(rows.len(), 3);

        let (graph, report) = build(rows, &IngestLimits::default()).unwrap();
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.lookup("Lovelace, Ada").is_some());
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let input = b"user1,user2\n\xff\xfe,Ada\n";
        let err = parse_edge_csv(input, true).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }
}
