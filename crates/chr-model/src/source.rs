use std::fmt;

use serde::{Deserialize, Serialize};

/// Publisher of a dataset. Release offsets are keyed by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFamily {
    /// County Health Rankings & Roadmaps.
    Chr,
    /// CDC PLACES: Local Data for Better Health.
    Places,
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFamily::Chr => f.write_str("CHR"),
            SourceFamily::Places => f.write_str("PLACES"),
        }
    }
}

/// One configured input of the pipeline.
///
/// `Ord` follows declaration order, which is also merge priority: a lower
/// variant wins when two sources report the same metric for the same
/// county and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Historical behavior measures, one release file per year.
    Places,
    /// Multi-year long-format trend file.
    ChrTrends,
    /// "Select Measure Data" sheet of the annual workbook.
    ChrSelect,
    /// "Additional Measure Data" sheet of the annual workbook.
    ChrAdditional,
}

impl SourceId {
    pub const PRIORITY: [SourceId; 4] = [
        SourceId::Places,
        SourceId::ChrTrends,
        SourceId::ChrSelect,
        SourceId::ChrAdditional,
    ];

    /// Position in [`SourceId::PRIORITY`]; 0 is the highest priority.
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn family(self) -> SourceFamily {
        match self {
            SourceId::Places => SourceFamily::Places,
            SourceId::ChrTrends | SourceId::ChrSelect | SourceId::ChrAdditional => {
                SourceFamily::Chr
            }
        }
    }

    /// Single-year cross-sectional sources whose values may be back-filled.
    pub fn is_snapshot(self) -> bool {
        matches!(self, SourceId::ChrSelect | SourceId::ChrAdditional)
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceId::Places => "places",
            SourceId::ChrTrends => "chr_trends",
            SourceId::ChrSelect => "chr_select",
            SourceId::ChrAdditional => "chr_additional",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SourceId::Places => "CDC PLACES county releases",
            SourceId::ChrTrends => "CHR trends file",
            SourceId::ChrSelect => "CHR workbook: Select Measure Data",
            SourceId::ChrAdditional => "CHR workbook: Additional Measure Data",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
