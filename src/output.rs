use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use csv::WriterBuilder;
use serde::Serialize;

pub const HEADER: [&str; 4] = ["Title", "Content", "Author", "Comments"];

/// One row of the output file. Field order is the wire order.
#[derive(Debug, Serialize)]
pub struct PostRecord {
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments: String,
}

/// Opens `path` for appending. The header row is written only when the file
/// is empty, so re-runs against an existing file append data rows only.
pub fn open_writer(path: &Path) -> anyhow::Result<csv::Writer<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let empty = file.metadata()?.len() == 0;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    if empty {
        writer.write_record(HEADER)?;
        writer.flush()?;
    }

    Ok(writer)
}

pub fn append_record<W: Write>(writer: &mut csv::Writer<W>, record: &PostRecord) -> csv::Result<()> {
    writer.serialize(record)
}

#[cfg(test)]
mod tests {
    use super::{HEADER, PostRecord, append_record, open_writer};

    fn record(title: &str) -> PostRecord {
        PostRecord {
            title: title.to_owned(),
            content: "body".to_owned(),
            author: "someone".to_owned(),
            comments: "no comments".to_owned(),
        }
    }

    #[test]
    fn fresh_file_gets_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = open_writer(&path).unwrap();
        append_record(&mut writer, &record("first")).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER.join(","));
        assert!(lines[1].starts_with("first,"));
    }

    #[test]
    fn reopening_does_not_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        for title in ["first", "second"] {
            let mut writer = open_writer(&path).unwrap();
            append_record(&mut writer, &record(title)).unwrap();
            writer.flush().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let headers = text.lines().filter(|l| *l == HEADER.join(",")).count();
        assert_eq!(headers, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn embedded_delimiters_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = open_writer(&path).unwrap();
        let rec = PostRecord {
            title: "a, title".to_owned(),
            content: "line one\nline two".to_owned(),
            author: "\"quoted\"".to_owned(),
            comments: "x: y | z: w".to_owned(),
        };
        append_record(&mut writer, &rec).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "a, title");
        assert_eq!(&row[1], "line one\nline two");
        assert_eq!(&row[2], "\"quoted\"");
        assert_eq!(&row[3], "x: y | z: w");
    }
}
