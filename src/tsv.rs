//! Tab-separated row format shared by the parse and reduce stages.
//!
//! Rows carry the eight [`NormalizedRecord`] columns in order, with no
//! header and no quoting. Tabs and line breaks inside a value are replaced
//! by spaces on write.

use std::io::{self, BufRead, Write};

use crate::normalize::NormalizedRecord;

/// Writes records as TSV rows.
pub struct TsvWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    /// Write one record.
    pub fn write_record(&mut self, record: &NormalizedRecord) -> io::Result<()> {
        for (i, column) in record.columns().iter().enumerate() {
            if i > 0 {
                self.inner.write_all(b"\t")?;
            }
            self.write_value(column)?;
        }
        self.inner.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Write a row that is already in TSV form.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.trim_end_matches(['\r', '\n']).as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    fn write_value(&mut self, value: &str) -> io::Result<()> {
        if value.contains(['\t', '\n', '\r']) {
            let cleaned = value.replace(['\t', '\n', '\r'], " ");
            self.inner.write_all(cleaned.as_bytes())
        } else {
            self.inner.write_all(value.as_bytes())
        }
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// First column of a row, the address prefix.
pub fn first_column(line: &str) -> &str {
    line.split('\t').next().unwrap_or_default().trim()
}

/// Non-empty rows of a TSV stream, line terminators removed.
pub fn read_rows<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader
        .lines()
        .filter(|line| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_record() {
        let record = NormalizedRecord {
            address_prefix: "10.0.0.0/24".into(),
            netname: String::new(),
            description: "NET-1".into(),
            country: "US".into(),
            maintained_by: "Example Inc".into(),
            created: "2001-01-01".into(),
            last_modified: "2020-02-02".into(),
            source: "arin".into(),
        };
        let mut writer = TsvWriter::new(Vec::new());
        writer.write_record(&record).unwrap();
        assert_eq!(writer.rows(), 1);
        assert_eq!(
            String::from_utf8(writer.into_inner()).unwrap(),
            "10.0.0.0/24\t\tNET-1\tUS\tExample Inc\t2001-01-01\t2020-02-02\tarin\n"
        );
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let record = NormalizedRecord {
            address_prefix: "10.0.0.0/8".into(),
            description: "a\tb\nc".into(),
            ..Default::default()
        };
        let mut writer = TsvWriter::new(Vec::new());
        writer.write_record(&record).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out.matches('\t').count(), 7);
        assert!(out.contains("a b c"));
    }

    #[test]
    fn test_read_rows_and_first_column() {
        let input = "10.0.0.0/8\tA\n\n2001:db8::/32\tB\r\n";
        let rows: Vec<String> = read_rows(input.as_bytes()).map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(first_column(&rows[0]), "10.0.0.0/8");
        assert_eq!(first_column(&rows[1]), "2001:db8::/32");
    }
}
