//! Comma-separated text with every field quoted.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::request::{ExportRequest, project_rows};

const BOM: &[u8] = "\u{feff}".as_bytes();

/// BOM, header row, then one row per record; rows joined by CRLF.
pub fn encode_delimited(request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
    if request.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut buf = BOM.to_vec();
    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .from_writer(&mut buf);
        writer.write_record(request.headers())?;
        for row in project_rows(request) {
            writer.write_record(&row)?;
        }
        writer
            .flush()
            .map_err(|e| ExportError::Delimited(e.to_string()))?;
    }

    if buf.ends_with(b"\r\n") {
        buf.truncate(buf.len() - 2);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExportColumn;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn request(records: Vec<Value>) -> ExportRequest {
        ExportRequest::new(
            "customers",
            vec![
                ExportColumn::new("name", "Name"),
                ExportColumn::new("phone", "Phone"),
                ExportColumn::new("address", "Address"),
            ],
            records,
        )
    }

    fn read_back(bytes: &[u8]) -> Vec<Vec<String>> {
        let body = bytes.strip_prefix(BOM).unwrap();
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(body)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn exact_bytes() {
        let bytes = encode_delimited(&request(vec![json!({
            "name": "Asha \"Lucky\" Traders",
            "phone": "98765 43210",
        })]))
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "\u{feff}\"Name\",\"Phone\",\"Address\"\r\n\"Asha \"\"Lucky\"\" Traders\",\"98765 43210\",\"\""
        );
    }

    #[test]
    fn commas_and_quotes_survive_a_round_trip() {
        let bytes = encode_delimited(&request(vec![
            json!({"name": "Ravi", "phone": "1", "address": "12, MG Road, Pune"}),
            json!({"name": "He said \"hi\"", "phone": null, "address": "line one\nline two"}),
        ]))
        .unwrap();

        assert_eq!(
            read_back(&bytes),
            vec![
                vec!["Name", "Phone", "Address"],
                vec!["Ravi", "1", "12, MG Road, Pune"],
                vec!["He said \"hi\"", "", "line one\nline two"],
            ]
        );
    }

    #[test]
    fn header_only_for_no_records() {
        let bytes = encode_delimited(&request(Vec::new())).unwrap();
        assert_eq!(read_back(&bytes).len(), 1);
        assert!(!bytes.ends_with(b"\r\n"));
    }

    #[test]
    fn no_columns_is_an_error() {
        let empty = ExportRequest::new("x", Vec::new(), vec![json!({})]);
        assert!(matches!(encode_delimited(&empty), Err(ExportError::NoColumns)));
    }

    proptest! {
        #[test]
        fn any_text_reads_back_unchanged(cells in proptest::collection::vec("[ -~]{0,12}", 1..8)) {
            let records = cells
                .iter()
                .map(|c| json!({"name": c, "phone": c, "address": c}))
                .collect();
            let rows = read_back(&encode_delimited(&request(records)).unwrap());
            prop_assert_eq!(rows.len(), cells.len() + 1);
            for (row, cell) in rows.iter().skip(1).zip(&cells) {
                prop_assert!(row.iter().all(|field| field == cell));
            }
        }
    }
}
