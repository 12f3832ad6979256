//! Registry source tags.

use std::fmt;
use std::path::Path;

/// Source identifies the registry a dump file was published by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Afrinic,
    Apnic,
    Arin,
    Lacnic,
    Ripe,
    Level3,
    Nttcom,
    Radb,
    Tc,
    Reach,
    Wcgdb,
    Jpirr,
}

impl Source {
    /// Every known registry, in filename-matching order.
    pub const ALL: [Source; 12] = [
        Source::Afrinic,
        Source::Apnic,
        Source::Arin,
        Source::Lacnic,
        Source::Ripe,
        Source::Level3,
        Source::Nttcom,
        Source::Radb,
        Source::Tc,
        Source::Reach,
        Source::Wcgdb,
        Source::Jpirr,
    ];

    /// Derive the source from a dump file name by prefix.
    ///
    /// Leading directories are ignored, so `databases/ripe.db.route.gz`
    /// and `ripe.db.route.gz` both resolve to [`Source::Ripe`].
    pub fn from_filename(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let source = Self::ALL
            .into_iter()
            .find(|s| name.starts_with(s.as_str()));
        if source.is_none() {
            log::error!("Can not determine source for {}", name);
        }
        source
    }

    /// Parse a source from its tag (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|src| src.as_str() == s)
    }

    /// Get the tag written into output rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Afrinic => "afrinic",
            Source::Apnic => "apnic",
            Source::Arin => "arin",
            Source::Lacnic => "lacnic",
            Source::Ripe => "ripe",
            Source::Level3 => "level3",
            Source::Nttcom => "nttcom",
            Source::Radb => "radb",
            Source::Tc => "tc",
            Source::Reach => "reach",
            Source::Wcgdb => "wcgdb",
            Source::Jpirr => "jpirr",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
