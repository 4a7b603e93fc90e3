use crate::extraction::TextSpan;
use serde::{Deserialize, Serialize};

pub const FLAG_SUPERSCRIPT: u32 = 1;
pub const FLAG_ITALIC: u32 = 2;
pub const FLAG_SERIFED: u32 = 4;
pub const FLAG_MONOSPACED: u32 = 8;
pub const FLAG_BOLD: u32 = 16;

/// The flags value the IOLMaster lens tables carry on the bold (recommended) row.
pub const IOLMASTER_BOLD_FLAGS: u32 = 20;

/// Predicate deciding whether a span is rendered bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoldMarker {
    /// `flags` equals `value` exactly.
    FlagsEqual { value: u32 },
    /// Any bit of `mask` is set in `flags`.
    FlagBit { mask: u32 },
    /// The font name contains `needle` (case-insensitive).
    FontNameContains { needle: String },
}

impl Default for BoldMarker {
    fn default() -> Self {
        BoldMarker::FlagsEqual {
            value: IOLMASTER_BOLD_FLAGS,
        }
    }
}

impl BoldMarker {
    pub fn is_bold(&self, span: &TextSpan) -> bool {
        match self {
            BoldMarker::FlagsEqual { value } => span.flags == *value,
            BoldMarker::FlagBit { mask } => span.flags & mask != 0,
            BoldMarker::FontNameContains { needle } => span
                .font
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// Derive a style bitmask from a font name and explicit bold/italic markup.
pub fn flags_for_font(font: &str, bold: bool, italic: bool) -> u32 {
    let lower = font.to_lowercase();
    let mut flags = 0;
    if bold || lower.contains("bold") || lower.contains("black") {
        flags |= FLAG_BOLD;
    }
    if italic || lower.contains("italic") || lower.contains("oblique") {
        flags |= FLAG_ITALIC;
    }
    if lower.contains("courier") || lower.contains("mono") {
        flags |= FLAG_MONOSPACED | FLAG_SERIFED;
    } else if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
        flags |= FLAG_SERIFED;
    }
    flags
}
