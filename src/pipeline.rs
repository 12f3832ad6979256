//! Parse driver: segment → extract → normalize → write.
//!
//! Files are processed one at a time in configured order. A file's objects
//! are fully read before extraction starts, and each file gets a fresh
//! [`Extractor`] so ARIN organizations never leak into the next file.
//! Object-level failures are logged and skipped; a missing or unreadable
//! file is logged and skipped. Only an invalid configuration or an output
//! write failure ends a run.

use std::io::Write;
use std::time::Instant;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::extract::Extractor;
use crate::normalize::normalize;
use crate::segment::{read_objects, RawObject};
use crate::tsv::TsvWriter;
use crate::Result;

/// Counters for one dump file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSummary {
    /// Objects segmented from the file
    pub objects: usize,
    /// Records written
    pub records: usize,
    /// Objects skipped on format or resolution errors
    pub skipped_objects: usize,
    /// Addresses dropped because they did not canonicalize
    pub dropped_addresses: usize,
}

/// Counters for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_parsed: usize,
    pub files_missing: usize,
    pub files_failed: usize,
    pub objects: usize,
    pub records: usize,
    pub skipped_objects: usize,
    pub dropped_addresses: usize,
}

impl RunSummary {
    fn add(&mut self, file: &FileSummary) {
        self.files_parsed += 1;
        self.objects += file.objects;
        self.records += file.records;
        self.skipped_objects += file.skipped_objects;
        self.dropped_addresses += file.dropped_addresses;
    }
}

/// Extract and write the records of one file's objects.
pub fn parse_objects<W: Write>(
    file: &str,
    objects: &[RawObject],
    writer: &mut TsvWriter<W>,
) -> Result<FileSummary> {
    let mut summary = FileSummary {
        objects: objects.len(),
        ..Default::default()
    };
    let mut extractor = Extractor::new(file);

    for object in objects {
        let record = match extractor.process(object) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{}", e);
                summary.skipped_objects += 1;
                continue;
            }
        };

        for result in normalize(&record) {
            match result {
                Ok(normalized) => {
                    writer.write_record(&normalized)?;
                    summary.records += 1;
                }
                Err(source) => {
                    let e = ParseError::Address {
                        context: extractor.context(object),
                        source,
                    };
                    log::warn!("{}", e);
                    summary.dropped_addresses += 1;
                }
            }
        }
    }

    Ok(summary)
}

/// Parse every configured file into `writer`.
pub fn run<W: Write>(config: &ParserConfig, writer: &mut TsvWriter<W>) -> Result<RunSummary> {
    config.validate()?;
    let overall = Instant::now();
    let mut summary = RunSummary::default();

    for file in &config.files {
        let path = config.path_of(file);
        if !path.exists() {
            log::info!(
                "File {} not found. Please download the registry dumps first",
                path.display()
            );
            summary.files_missing += 1;
            continue;
        }

        log::info!("parsing database file: {}", path.display());
        let start = Instant::now();
        let objects = match read_objects(&path) {
            Ok(objects) => objects,
            Err(e) => {
                log::error!("Could not read {}: {}", path.display(), e);
                summary.files_failed += 1;
                continue;
            }
        };
        log::info!(
            "database parsing finished: {:.2} seconds",
            start.elapsed().as_secs_f64()
        );

        log::info!("parsing blocks");
        let start = Instant::now();
        let file_summary = parse_objects(file, &objects, writer)?;
        log::info!(
            "block parsing finished: {:.2} seconds",
            start.elapsed().as_secs_f64()
        );

        log::info!(
            "{}: {} objects, {} records, {} skipped",
            file,
            file_summary.objects,
            file_summary.records,
            file_summary.skipped_objects
        );
        summary.add(&file_summary);
    }

    writer.flush()?;
    log::info!(
        "script finished: {:.2} seconds",
        overall.elapsed().as_secs_f64()
    );
    Ok(summary)
}
