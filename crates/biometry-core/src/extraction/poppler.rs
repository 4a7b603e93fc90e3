use crate::error::BiometryError;
use crate::extraction::style::{flags_for_font, FLAG_BOLD};
use crate::extraction::{BoldMarker, Document, Page, PdfExtractor, TextSpan};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using poppler-utils.
///
/// The title comes from `pdfinfo`, the positioned text runs from
/// `pdftohtml -xml` at zoom 1 so coordinates stay in PDF points.
pub struct PopplerExtractor;

impl PopplerExtractor {
    pub fn new() -> Self {
        PopplerExtractor
    }

    /// Check if both poppler tools are available on the system.
    pub fn is_available() -> bool {
        ["pdfinfo", "pdftohtml"].iter().all(|tool| {
            Command::new(tool)
                .arg("-v")
                .output()
                .map(|o| o.status.success() || !o.stderr.is_empty())
                .unwrap_or(false)
        })
    }
}

impl Default for PopplerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PopplerExtractor {
    fn extract(&self, pdf_bytes: &[u8]) -> Result<Document, BiometryError> {
        // The temp file is removed when `tmpfile` drops, whichever way we leave.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| BiometryError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| BiometryError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path();

        let info = run_tool("pdfinfo", &["-enc", "UTF-8"], tmp_path)?;
        let title = parse_info_title(&info).unwrap_or_default();

        let xml = run_tool(
            "pdftohtml",
            &["-xml", "-i", "-q", "-stdout", "-zoom", "1", "-fontfullname"],
            tmp_path,
        )?;
        let pages = parse_pdf2xml(&xml)?;

        Ok(Document { title, pages })
    }

    fn backend_name(&self) -> &str {
        "poppler"
    }

    fn bold_marker(&self) -> BoldMarker {
        BoldMarker::FlagBit { mask: FLAG_BOLD }
    }
}

fn run_tool(tool: &'static str, args: &[&str], pdf_path: &Path) -> Result<String, BiometryError> {
    let output = Command::new(tool)
        .args(args)
        .arg(pdf_path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BiometryError::PopplerNotFound { tool }
            } else {
                BiometryError::Extraction(format!("{tool} failed: {e}"))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(BiometryError::PopplerFailed { tool, code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_info_title(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Title:"))
        .map(|rest| rest.trim().to_string())
}

struct PendingRun {
    top: f64,
    left: f64,
    height: f64,
    font_id: String,
    text: String,
    bold: bool,
    italic: bool,
}

/// Parse `pdftohtml -xml` output into pages of text spans.
fn parse_pdf2xml(xml: &str) -> Result<Vec<Page>, BiometryError> {
    let mut reader = Reader::from_str(xml);
    let mut pages: Vec<Page> = Vec::new();
    let mut fonts: HashMap<String, String> = HashMap::new();
    let mut pending: Option<PendingRun> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| BiometryError::Extraction(format!("pdftohtml XML: {e}")))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => {
                    let number = attr_f64(&e, "number")?.map_or(pages.len() + 1, |n| n as usize);
                    pages.push(Page {
                        number,
                        width: attr_f64(&e, "width")?.unwrap_or(0.0),
                        height: attr_f64(&e, "height")?.unwrap_or(0.0),
                        spans: Vec::new(),
                    });
                }
                b"fontspec" => register_font(&e, &mut fonts)?,
                b"text" => {
                    pending = Some(PendingRun {
                        top: attr_f64(&e, "top")?.unwrap_or(0.0),
                        left: attr_f64(&e, "left")?.unwrap_or(0.0),
                        height: attr_f64(&e, "height")?.unwrap_or(0.0),
                        font_id: attr(&e, "font")?.unwrap_or_default(),
                        text: String::new(),
                        bold: false,
                        italic: false,
                    })
                }
                b"b" => {
                    if let Some(run) = pending.as_mut() {
                        run.bold = true;
                    }
                }
                b"i" => {
                    if let Some(run) = pending.as_mut() {
                        run.italic = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"fontspec" {
                    register_font(&e, &mut fonts)?;
                }
            }
            Event::Text(t) => {
                if let Some(run) = pending.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| BiometryError::Extraction(format!("pdftohtml XML: {e}")))?;
                    run.text.push_str(&text);
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"text" {
                    if let Some(run) = pending.take() {
                        finish_run(run, &fonts, &mut pages);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn finish_run(run: PendingRun, fonts: &HashMap<String, String>, pages: &mut Vec<Page>) {
    let text = run.text.trim();
    if text.is_empty() {
        return;
    }
    let font = fonts.get(&run.font_id).cloned().unwrap_or_default();
    let flags = flags_for_font(&font, run.bold, run.italic);
    let y = baseline(run.top, run.height);
    let span = TextSpan::new(text, run.left, y).with_style(font, flags);

    if pages.is_empty() {
        pages.push(Page {
            number: 1,
            ..Page::default()
        });
    }
    if let Some(page) = pages.last_mut() {
        page.spans.push(span);
    }
}

/// Share of a pdftohtml text box that lies below the baseline.
const DESCENT_RATIO: f64 = 0.2;

/// Baseline estimate for a pdftohtml text box. The box spans `top` to
/// `top + height` (whole points), with the descenders below the baseline.
fn baseline(top: f64, height: f64) -> f64 {
    top + height * (1.0 - DESCENT_RATIO)
}

fn register_font(e: &BytesStart, fonts: &mut HashMap<String, String>) -> Result<(), BiometryError> {
    if let (Some(id), Some(family)) = (attr(e, "id")?, attr(e, "family")?) {
        fonts.insert(id, family);
    }
    Ok(())
}

fn attr(e: &BytesStart, name: &str) -> Result<Option<String>, BiometryError> {
    for a in e.attributes() {
        let a = a.map_err(|err| BiometryError::Extraction(format!("pdftohtml XML: {err}")))?;
        if a.key.as_ref() == name.as_bytes() {
            let value = a
                .unescape_value()
                .map_err(|err| BiometryError::Extraction(format!("pdftohtml XML: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn attr_f64(e: &BytesStart, name: &str) -> Result<Option<f64>, BiometryError> {
    Ok(attr(e, name)?.and_then(|v| v.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
<pdf2xml producer="poppler" version="23.02.0">
<page number="1" position="absolute" top="0" left="0" height="792" width="612">
	<fontspec id="0" size="9" family="Courier" color="#000000"/>
	<fontspec id="1" size="9" family="Courier-Bold" color="#000000"/>
<text top="395" left="335" width="21" height="9" font="0">17.0</text>
<text top="404" left="335" width="21" height="9" font="1"><b>17.5</b></text>
<text top="100" left="54" width="60" height="10" font="0">Name &amp; ID:</text>
<text top="100" left="120" width="6" height="10" font="0"> </text>
</page>
</pdf2xml>
"##;

    #[test]
    fn test_parse_info_title() {
        let info = "Title:          IOL-Haigis\nCreator:        IOLMaster\nPages:          1\n";
        assert_eq!(parse_info_title(info).as_deref(), Some("IOL-Haigis"));
        assert_eq!(parse_info_title("Pages: 1\n"), None);
    }

    #[test]
    fn test_parse_pdf2xml_spans() {
        let pages = parse_pdf2xml(SAMPLE).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].width, 612.0);

        let spans = &pages[0].spans;
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "17.0");
        assert_eq!(spans[0].origin.x, 335.0);
        assert!((spans[0].origin.y - 402.2).abs() < 1e-9);
        assert_eq!(spans[0].font, "Courier");
        assert_eq!(spans[0].flags & FLAG_BOLD, 0);

        assert_eq!(spans[1].text, "17.5");
        assert_eq!(spans[1].flags & FLAG_BOLD, FLAG_BOLD);
        assert_eq!(spans[2].text, "Name & ID:");
    }

    #[test]
    fn test_baseline_stays_above_region_edge() {
        // Box bottom (312) falls inside the first lens cell, the baseline
        // (310) still belongs to the eye header above it.
        let xml = r#"<pdf2xml>
<page number="1" top="0" left="0" height="792" width="612">
<text top="302" left="60" width="30" height="10" font="0">AL:</text>
</page>
</pdf2xml>"#;
        let pages = parse_pdf2xml(xml).unwrap();
        let spans = &pages[0].spans;
        assert_eq!(spans[0].origin.y, 310.0);

        let table = crate::layout::tables::iol_haigis();
        assert_eq!(table.select("od_header", spans).len(), 1);
        assert!(table.select("od_lens_1", spans).is_empty());
    }

    #[test]
    fn test_poppler_bold_marker_matches_bold_runs() {
        let pages = parse_pdf2xml(SAMPLE).unwrap();
        let marker = PopplerExtractor::new().bold_marker();
        assert!(!marker.is_bold(&pages[0].spans[0]));
        assert!(marker.is_bold(&pages[0].spans[1]));
    }
}
