//! netblocks - normalize registry WHOIS dumps into a network-block table.
//!
//! This crate turns the bulk database dumps published by Regional and
//! Internet Routing Registries into one tab-separated table of network
//! blocks, and reduces any subset of that table to the minimal set of
//! CIDR blocks spanning the same addresses.
//!
//! # Pipeline
//!
//! 1. [`segment`] cuts a dump (plain or gzip) into objects and tags each
//!    with its [`Source`] registry.
//! 2. [`extract`] reads fields from ARIN's flat format (resolving `OrgID`
//!    references) or from RPSL.
//! 3. [`normalize`] expands ranges and `route-set` members into one
//!    [`NormalizedRecord`] per CIDR.
//! 4. [`tsv`] writes the records as rows.
//!
//! [`reduce`] runs as a separate pass over rows of the same shape.
//!
//! # Quick Start
//!
//! ```ignore
//! use netblocks::{pipeline, ParserConfig, TsvWriter};
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! let config = ParserConfig::new("./databases");
//! let mut writer = TsvWriter::new(BufWriter::new(File::create("network_info.tsv")?));
//! let summary = pipeline::run(&config, &mut writer)?;
//! println!("{} network blocks", summary.records);
//! ```
//!
//! # Reduction
//!
//! ```
//! use netblocks::reduce::{reduce, AddressBlock};
//!
//! let blocks = ["192.168.0.0/24", "192.168.1.0/24", "192.168.0.0/16"]
//!     .iter()
//!     .map(|c| AddressBlock::new(c.parse().unwrap(), *c));
//! let reduced: Vec<_> = reduce(blocks).into_iter().map(|b| b.payload).collect();
//! assert_eq!(reduced, vec!["192.168.0.0/16"]);
//! ```

mod error;
mod source;

pub mod address;
pub mod config;
pub mod extract;
pub mod metadata;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod reduce;
pub mod rpsl;
pub mod segment;
pub mod tsv;

// Re-export core types
pub use error::{AddressParseError, Error, ObjectContext, ParseError, Result, RpslError};
pub use source::Source;

pub use address::{CanonicalAddress, Family};
pub use config::{ArinCredentials, ParserConfig, PublishConfig};
pub use extract::{Extractor, OrgRecord, OrgTable};
pub use metadata::RunMetadata;
pub use normalize::NormalizedRecord;
pub use pipeline::RunSummary;
pub use reduce::AddressBlock;
pub use tsv::TsvWriter;
