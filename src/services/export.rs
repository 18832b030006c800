//! CSV export of documents.

use crate::models::Document;

/// Column header line.
pub const CSV_HEADER: [&str; 5] = ["Title", "Number", "Date", "Status", "URL"];

/// Quote a field when it contains a separator, quote or line break.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_row<'a>(output: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let row: Vec<String> = fields.into_iter().map(escape_csv).collect();
    output.push_str(&row.join(","));
    output.push_str("\r\n");
}

/// Render documents as CSV with a header row.
pub fn documents_to_csv(documents: &[Document]) -> String {
    let mut output = String::new();
    write_row(&mut output, CSV_HEADER);
    for doc in documents {
        let date = doc.date.format("%Y-%m-%d").to_string();
        write_row(
            &mut output,
            [
                doc.title.as_str(),
                doc.number.as_str(),
                date.as_str(),
                doc.status.as_str(),
                doc.url.as_str(),
            ],
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a, b"), "\"a, b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_documents_to_csv() {
        let docs = vec![Document {
            id: 7,
            title: "Real Decreto 1/2024, de 9 de enero".to_string(),
            number: "BOE-A-2024-100".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: "Publicado".to_string(),
            url: "https://www.boe.es/x.pdf".to_string(),
        }];

        let csv = documents_to_csv(&docs);
        let lines: Vec<_> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "Title,Number,Date,Status,URL");
        assert_eq!(
            lines[1],
            "\"Real Decreto 1/2024, de 9 de enero\",BOE-A-2024-100,2024-01-10,Publicado,https://www.boe.es/x.pdf"
        );
        assert_eq!(lines[2], "");
        assert_eq!(documents_to_csv(&[]), "Title,Number,Date,Status,URL\r\n");
    }
}
