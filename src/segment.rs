//! Dump file segmentation.
//!
//! A dump is a sequence of objects separated by blank lines. Comment lines
//! (`%` or `#`) are dropped. A buffered object is kept only when its first
//! line starts an object class we extract; everything else (file headers,
//! `aut-num`, `person`, ...) is discarded here.

use flate2::read::MultiGzDecoder;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ObjectContext;
use crate::Source;

/// `inetnum`, `inet6num`, `route`, `route6`, `route-set`, ...
static RPSL_OBJECT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(inet|route).{0,5}:").expect("valid RPSL class regex"));

/// Name of the synthetic provenance attribute appended to every object.
pub const CUSTOM_SOURCE_ATTR: &str = "cust_source";

/// Object family, decided by the first line of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// ARIN `OrgID:` organization object
    ArinOrganization,
    /// ARIN `NetHandle:` / `V6NetHandle:` network object
    ArinNetwork,
    /// Generic RPSL object
    Rpsl,
}

impl ObjectKind {
    /// Classify an object by its first line.
    pub fn classify(first_line: &[u8]) -> Option<Self> {
        if first_line.starts_with(b"OrgID:") {
            Some(ObjectKind::ArinOrganization)
        } else if first_line.starts_with(b"NetHandle:") || first_line.starts_with(b"V6NetHandle:") {
            Some(ObjectKind::ArinNetwork)
        } else if RPSL_OBJECT_START.is_match(first_line) {
            Some(ObjectKind::Rpsl)
        } else {
            None
        }
    }
}

/// One logical object cut out of a dump file.
#[derive(Debug, Clone)]
pub struct RawObject {
    /// Registry the dump came from
    pub source: Option<Source>,
    /// Byte offset of the first line in the (decompressed) file
    pub offset: u64,
    /// Object kind, from the first line
    pub kind: ObjectKind,
    /// Raw lines, including the trailing `cust_source` attribute
    pub data: Vec<u8>,
}

impl RawObject {
    /// First line of the object, without the line terminator.
    pub fn first_line(&self) -> &[u8] {
        let end = self
            .data
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(self.data.len());
        let line = &self.data[..end];
        line.strip_suffix(b"\r").unwrap_or(line)
    }

    /// Object text, invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Error context for this object.
    pub fn context(&self, file: &str) -> ObjectContext {
        ObjectContext {
            file: file.to_string(),
            offset: self.offset,
            snippet: String::from_utf8_lossy(self.first_line()).into_owned(),
        }
    }
}

/// Lazy iterator over the objects of one dump stream.
pub struct Segmenter<R> {
    reader: R,
    source: Option<Source>,
    offset: u64,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Segmenter<R> {
    /// Create a segmenter tagging every object with `source`.
    pub fn new(reader: R, source: Option<Source>) -> Self {
        Self {
            reader,
            source,
            offset: 0,
            line: Vec::new(),
            done: false,
        }
    }

    /// Turn a finished buffer into an object, if it is one we extract.
    fn finish(&self, mut data: Vec<u8>, offset: u64) -> Option<RawObject> {
        if data.is_empty() {
            return None;
        }
        let first_line = data.split(|b| *b == b'\n').next().unwrap_or_default();
        let kind = ObjectKind::classify(first_line)?;

        if !data.ends_with(b"\n") {
            data.push(b'\n');
        }
        let tag = self.source.map(|s| s.as_str()).unwrap_or_default();
        data.extend_from_slice(format!("{}: {}\n", CUSTOM_SOURCE_ATTR, tag).as_bytes());

        Some(RawObject {
            source: self.source,
            offset,
            kind,
            data,
        })
    }
}

impl<R: BufRead> Iterator for Segmenter<R> {
    type Item = io::Result<RawObject>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = Vec::new();
        let mut start = self.offset;

        while !self.done {
            self.line.clear();
            let line_offset = self.offset;
            let n = match self.reader.read_until(b'\n', &mut self.line) {
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.offset += n as u64;

            // EOF flushes whatever is buffered
            if n == 0 {
                self.done = true;
                return self.finish(buffer, start).map(Ok);
            }

            if self.line.starts_with(b"%") || self.line.starts_with(b"#") {
                continue;
            }

            if self.line.iter().all(u8::is_ascii_whitespace) {
                match self.finish(std::mem::take(&mut buffer), start) {
                    Some(object) => return Some(Ok(object)),
                    None => continue,
                }
            }

            if buffer.is_empty() {
                start = line_offset;
            }
            buffer.extend_from_slice(&self.line);
        }

        None
    }
}

/// Open a dump file, decompressing `.gz` files on the fly.
pub fn open_dump(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every object of a dump file into memory.
pub fn read_objects(path: &Path) -> io::Result<Vec<RawObject>> {
    let source = Source::from_filename(path);
    let mut objects = Vec::new();

    for object in Segmenter::new(open_dump(path)?, source) {
        objects.push(object?);
        if objects.len() % 1000 == 0 {
            log::debug!("parsed another 1000 blocks ({} so far)", objects.len());
        }
    }

    log::info!("Got {} blocks", objects.len());
    Ok(objects)
}
