use crate::extraction::TextSpan;
use crate::layout::{group_lines_tolerant, Line};
use crate::model::Fields;
use crate::parsing::values::{parse_millimetres, parse_number};

/// Keys that repeat once per measurement row and get `_<n>` suffixes.
const REPEATED_KEYS: [&str; 3] = ["K1", "K2", "DeltaK"];
const DELTA_SYMBOLS: [&str; 2] = ["\u{2206}", "\u{0394}"];
const AL_SNR_HEADER: [&str; 2] = ["AL", "SNR"];

/// Split off the next `key<delim>value` pair, `<delim>` being `:` or `=`.
///
/// Returns `(key, value, rest)`, or `None` once no delimiter is left. When
/// another delimiter follows, the value stops at the last space before it so
/// `"K1:43.25 K2:44.10"` yields two pairs.
pub fn next_pair(text: &str) -> Option<(&str, &str, &str)> {
    let bytes = text.as_bytes();
    let is_delim = |b: &u8| *b == b':' || *b == b'=';

    let key_end = bytes.iter().position(is_delim)?;
    let value_start = key_end + 1;
    let mut value_end = bytes[value_start..]
        .iter()
        .position(is_delim)
        .map_or(bytes.len(), |p| value_start + p);
    if value_end < bytes.len() {
        while value_end > value_start && bytes[value_end - 1] != b' ' {
            value_end -= 1;
        }
    }

    Some((
        &text[..key_end],
        &text[value_start..value_end],
        &text[value_end..],
    ))
}

fn clean(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '(' || c == ')')
}

/// AL/SNR table capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlSnrState {
    Idle,
    Capturing { next: usize },
    Finished,
}

/// Whether the previous line announced positional ACD readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcdState {
    Idle,
    Pending,
}

/// Single top-to-bottom pass over one eye's measurement lines.
#[derive(Debug, Clone)]
pub struct MmtScanner {
    fields: Fields,
    acd: AcdState,
    al_snr: AlSnrState,
}

impl Default for MmtScanner {
    fn default() -> Self {
        MmtScanner {
            fields: Fields::new(),
            acd: AcdState::Idle,
            al_snr: AlSnrState::Idle,
        }
    }
}

impl MmtScanner {
    pub fn acd_state(&self) -> AcdState {
        self.acd
    }

    pub fn al_snr_state(&self) -> AlSnrState {
        self.al_snr
    }

    pub fn feed(&mut self, line: &Line) {
        match self.acd {
            AcdState::Pending => {
                for (i, span) in line.spans.iter().enumerate() {
                    self.fields.insert(format!("ACD_{i}"), span.text.as_str());
                }
                self.acd = AcdState::Idle;
            }
            AcdState::Idle => {
                self.scan_pairs(line);
                if line.first_text().is_some_and(|t| t.starts_with("ACD:")) {
                    self.acd = AcdState::Pending;
                }
            }
        }

        self.feed_al_snr(line);
    }

    pub fn finish(self) -> Fields {
        self.fields
    }

    fn scan_pairs(&mut self, line: &Line) {
        for (i, span) in line.spans.iter().enumerate() {
            let mut rest = span.text.as_str();
            while let Some((raw_key, raw_value, tail)) = next_pair(rest) {
                rest = tail;
                if raw_key.is_empty() && raw_value.is_empty() {
                    continue;
                }

                let mut key = clean(raw_key).to_string();
                let after_delta = i > 0
                    && DELTA_SYMBOLS.contains(&line.spans[i - 1].text.trim());
                if key == "K" && after_delta {
                    key = "DeltaK".to_string();
                }
                if REPEATED_KEYS.contains(&key.as_str()) {
                    key = self.next_free_suffix(&key);
                }
                self.fields.insert(key, clean(raw_value));
            }
        }
    }

    fn next_free_suffix(&self, key: &str) -> String {
        (0..)
            .map(|n| format!("{key}_{n}"))
            .find(|candidate| !self.fields.contains_key(candidate))
            .unwrap_or_else(|| key.to_string())
    }

    fn feed_al_snr(&mut self, line: &Line) {
        self.al_snr = match self.al_snr {
            AlSnrState::Idle if line.starts_with_texts(&AL_SNR_HEADER) => {
                AlSnrState::Capturing { next: 0 }
            }
            AlSnrState::Capturing { next } => match parse_al_snr(line) {
                Some((al, snr)) => {
                    self.fields.insert(format!("AL_{next}"), al);
                    self.fields.insert(format!("SNR_{next}"), snr);
                    AlSnrState::Capturing { next: next + 1 }
                }
                None => AlSnrState::Finished,
            },
            state => state,
        };
    }
}

fn parse_al_snr(line: &Line) -> Option<(f64, f64)> {
    let al = parse_millimetres(line.text(0)?)?;
    let snr = parse_number(line.text(1)?)?;
    Some((al, snr))
}

/// Extract measurement key/values from one eye's MMT region.
///
/// Never fails; unrecognised lines simply contribute nothing.
pub fn extract_measurements(spans: &[&TextSpan], tolerance: f64) -> Fields {
    let mut scanner = MmtScanner::default();
    for line in group_lines_tolerant(spans, tolerance) {
        scanner.feed(&line);
    }
    scanner.finish()
}
