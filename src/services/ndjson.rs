use log::warn;
use crate::models::ollama::OllamaReturnObj;

/// Parses a `/api/generate` body into its records.
///
/// Each non-empty line is decoded on its own. Lines that are not valid
/// records (including a truncated last line) are skipped with a warning,
/// so one bad line never costs the rest of the reply.
pub fn parse_ndjson(body: &str) -> Vec<OllamaReturnObj> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter_map(|(index, line)| match serde_json::from_str::<OllamaReturnObj>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed NDJSON record #{}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Joins the `response` fragments in arrival order.
pub fn assemble_response(records: &[OllamaReturnObj]) -> String {
    records.iter().map(|record| record.response.as_str()).collect()
}

/// Continuation state of the reply: the context of the last record carrying one.
pub fn final_context(records: &[OllamaReturnObj]) -> Option<Vec<i64>> {
    records.iter().rev().find_map(|record| record.context.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = concat!(
        "{\"model\":\"llama3.2\",\"response\":\"Hel\",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"lo \",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"world\",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"\",\"done\":true,\"context\":[7,8,9]}\n",
    );

    #[test]
    fn concatenated_fragments_give_the_full_reply() {
        let records = parse_ndjson(BODY);
        assert_eq!(records.len(), 4);
        assert_eq!(assemble_response(&records), "Hello world");
        assert!(records[3].done);
        assert_eq!(final_context(&records), Some(vec![7, 8, 9]));
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let body = "{\"response\":\"a\"}\n\nnot json\n{\"response\":\"b\",\"done\":true,\"context\":[1]}\n";
        let records = parse_ndjson(body);
        assert_eq!(records.len(), 2);
        assert_eq!(assemble_response(&records), "ab");
    }

    #[test]
    fn truncated_last_record_is_dropped() {
        let body = "{\"response\":\"ok\",\"done\":false}\n{\"response\":\"cut";
        let records = parse_ndjson(body);
        assert_eq!(records.len(), 1);
        assert_eq!(final_context(&records), None);
    }

    #[test]
    fn crlf_separated_records_parse() {
        let body = "{\"response\":\"x\"}\r\n{\"response\":\"y\",\"context\":[4]}\r\n";
        let records = parse_ndjson(body);
        assert_eq!(assemble_response(&records), "xy");
        assert_eq!(final_context(&records), Some(vec![4]));
    }

    #[test]
    fn empty_body_yields_nothing() {
        assert!(parse_ndjson("").is_empty());
        assert_eq!(assemble_response(&[]), "");
    }
}
