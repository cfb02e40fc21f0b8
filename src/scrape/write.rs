use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::types::{CommentMention, ScrapedRecord, MENTION_HEADER, RECORD_HEADER};

/// Overwrites `path` with a header row and one row per record.
pub fn write_records(path: &Path, records: &[ScrapedRecord]) -> Result<()> {
    write_csv_file(path, &RECORD_HEADER, records)
}

pub fn write_mentions(path: &Path, mentions: &[CommentMention]) -> Result<()> {
    write_csv_file(path, &MENTION_HEADER, mentions)
}

fn write_csv_file<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    write_csv(file, header, rows).with_context(|| format!("cannot write {}", path.display()))
}

// Header goes out explicitly so an empty row set still yields a header-only file.
pub fn write_csv<W: Write, T: Serialize>(w: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, body: &str) -> ScrapedRecord {
        ScrapedRecord {
            source: "Forum".into(),
            thread_url: "https://forum.example.org/t/1".into(),
            fetch_url: "https://forum.example.org/t/1".into(),
            title: title.into(),
            author: "sparky".into(),
            date: String::new(),
            body: body.into(),
            post_count: 3,
            brands: "Ohme; Zappi".into(),
            tariffs: String::new(),
            scraped_at: "2025-06-01 12:30:00".into(),
            status: "ok".into(),
            error: String::new(),
        }
    }

    #[test]
    fn empty_set_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_records(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n", RECORD_HEADER.join(",")));
    }

    #[test]
    fn tricky_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            record("Zappi, Ohme or \"other\"?", "line one\nline two, with comma"),
            record("plain", "plain body"),
        ];
        write_records(&path, &rows).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, RECORD_HEADER);
        let got: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(&got[0][3], "Zappi, Ohme or \"other\"?");
        assert_eq!(&got[0][6], "line one\nline two, with comma");
        assert_eq!(&got[0][7], "3");
        assert_eq!(&got[1][3], "plain");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale,data\n1,2\n3,4\n5,6\n").unwrap();
        write_records(&path, &[record("t", "b")]).unwrap();
        let n = csv::Reader::from_path(&path).unwrap().records().count();
        assert_eq!(n, 1);
    }

    #[test]
    fn mention_header_matches_fields() {
        let m = CommentMention {
            source: "Reddit".into(),
            thread_url: "https://old.reddit.com/r/ev/comments/x/y/".into(),
            thread_title: "t".into(),
            comment_id: "t1_a".into(),
            comment_author: "alice".into(),
            comment_date: "2025-03-01".into(),
            brand: "Easee".into(),
            reason: "Easee is tidy".into(),
            tariff: "None".into(),
            comment_text: "Easee is tidy".into(),
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &MENTION_HEADER, &[m]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(MENTION_HEADER.join(",").as_str()));
        assert_eq!(lines.next(), Some("Reddit,https://old.reddit.com/r/ev/comments/x/y/,t,t1_a,alice,2025-03-01,Easee,Easee is tidy,None,Easee is tidy"));
    }

    #[test]
    fn unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_records(&path, &[]).unwrap_err();
        assert!(err.to_string().contains("cannot create"));
    }
}
