//! Versioned run-configuration schemas.
//!
//! A schema fixes which parameter names a sweep may use, the order in which
//! they form a tag, which of them key the geometry cache, and how the engine
//! is invoked. Older parameter spellings are accepted and mapped onto the
//! canonical names at the parsing boundary.

use serde::{Deserialize, Serialize};

/// Field names shared by both schema versions.
pub mod field {
    pub const DELTA: &str = "delta";
    pub const N_REGIONS: &str = "n_regions";
    pub const REGION_SIZE: &str = "region_size";
    pub const RATIO: &str = "ratio";
    pub const ARCHIVE_SIZE: &str = "archive_size";
}

/// Historical spellings of parameter names and their canonical replacement.
const ALIASES: &[(&str, &str)] = &[
    ("n_aois", field::N_REGIONS),
    ("n_rois", field::N_REGIONS),
    ("aoi_size", field::REGION_SIZE),
    ("roi_size", field::REGION_SIZE),
    ("size", field::REGION_SIZE),
    ("aoi_ratio", field::RATIO),
    ("roi_ratio", field::RATIO),
    ("archive", field::ARCHIVE_SIZE),
    ("n_scenes", field::ARCHIVE_SIZE),
];

/// How the synthesized regions are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSizing {
    /// `region_size` is an absolute polygon area.
    Absolute,
    /// `ratio` is a fraction of the generation bounds' area.
    BoundsRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepSchema {
    /// Flag-style invocation, one flat trial list per report.
    #[default]
    Query,
    /// JSON-settings invocation, reports split into `discrete`/`continuous`.
    Coverage,
}

impl SweepSchema {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SweepSchema::Query => "query",
            SweepSchema::Coverage => "coverage",
        }
    }

    /// Recognized fields in tag order.
    #[must_use]
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SweepSchema::Query => &[
                field::DELTA,
                field::N_REGIONS,
                field::REGION_SIZE,
                field::ARCHIVE_SIZE,
            ],
            SweepSchema::Coverage => &[
                field::DELTA,
                field::N_REGIONS,
                field::RATIO,
                field::ARCHIVE_SIZE,
            ],
        }
    }

    /// Fields that identify a geometry artifact, in file-name order.
    #[must_use]
    pub fn geometry_fields(self) -> &'static [&'static str] {
        match self {
            SweepSchema::Query => &[field::N_REGIONS, field::REGION_SIZE],
            SweepSchema::Coverage => &[field::N_REGIONS, field::RATIO],
        }
    }

    #[must_use]
    pub fn sizing(self) -> RegionSizing {
        match self {
            SweepSchema::Query => RegionSizing::Absolute,
            SweepSchema::Coverage => RegionSizing::BoundsRatio,
        }
    }

    /// Map a possibly-legacy parameter name to its canonical form, or `None`
    /// if this schema does not recognize it.
    #[must_use]
    pub fn canonical_name(self, name: &str) -> Option<&'static str> {
        let resolved = ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |(_, canonical)| canonical);
        self.fields().iter().copied().find(|f| *f == resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_per_schema() {
        assert_eq!(
            SweepSchema::Query.canonical_name("n_aois"),
            Some(field::N_REGIONS)
        );
        assert_eq!(
            SweepSchema::Query.canonical_name("aoi_size"),
            Some(field::REGION_SIZE)
        );
        assert_eq!(SweepSchema::Query.canonical_name("ratio"), None);
        assert_eq!(
            SweepSchema::Coverage.canonical_name("roi_ratio"),
            Some(field::RATIO)
        );
        assert_eq!(
            SweepSchema::Coverage.canonical_name("archive"),
            Some(field::ARCHIVE_SIZE)
        );
    }
}
