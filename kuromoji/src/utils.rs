use csv_core::{ReadFieldResult, WriteResult};

/// Splits a csv row into fields, handling double-quoted cells.
///
/// Returns `None` if the row contains a field too large to decode or
/// invalid UTF-8 inside a field.
pub fn parse_csv_row(row: &str) -> Option<Vec<String>> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
            ReadFieldResult::Field { record_end } => record_end,
            ReadFieldResult::OutputFull => return None,
        };
        fields.push(std::str::from_utf8(&output[..nout]).ok()?.to_string());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    Some(fields)
}

/// Joins fields into a csv row, quoting cells that need it.
pub fn join_csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = Vec::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i != 0 {
            row.push(b',');
        }
        quote_csv_cell(&mut row, field.as_ref().as_bytes());
    }
    // csv_core only copies input bytes and ASCII quotes.
    String::from_utf8(row).unwrap_or_default()
}

fn quote_csv_cell(wtr: &mut Vec<u8>, mut data: &[u8]) {
    let mut output = [0; 4096];
    let mut writer = csv_core::Writer::new();
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        wtr.extend_from_slice(&output[..nout]);
        if result == WriteResult::InputEmpty {
            break;
        }
        data = &data[nin..];
    }
    let (_, nout) = writer.finish(&mut output);
    wtr.extend_from_slice(&output[..nout]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_row() {
        assert_eq!(
            &["名詞", "トスカーナ"],
            parse_csv_row("名詞,トスカーナ").unwrap().as_slice()
        );
    }

    #[test]
    fn test_parse_csv_row_with_quote() {
        assert_eq!(
            &["名詞", "1,2-ジクロロエタン"],
            parse_csv_row("名詞,\"1,2-ジクロロエタン\"").unwrap().as_slice()
        );
    }

    #[test]
    fn test_join_csv_row() {
        assert_eq!("名詞,一般", join_csv_row(["名詞", "一般"]));
        assert_eq!(
            "名詞,\"1,2-ジクロロエタン\"",
            join_csv_row(["名詞", "1,2-ジクロロエタン"])
        );
    }
}
