use crate::error::BiometryError;
use crate::extraction::{BoldMarker, Document, TextSpan};
use crate::layout::{group_lines_tolerant, tables, RegionTable};
use crate::model::{
    Fields, IolEye, IolLayout, IolReport, MmtReport, ParseWarning, ParsedReport, Report,
    UnrecognizedReport, WarningKind,
};
use crate::options::ExtractOptions;
use crate::parsing::{extract_key_values, extract_lens, extract_measurements};

const LENS_REGIONS_PER_EYE: usize = 4;
const EYES: [&str; 2] = ["od", "os"];

/// Report type decided from the PDF title metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Iol(IolLayout),
    /// Title starts with "IOL" but no region table exists for it.
    IolUnknown,
    MmtFull,
    Unrecognized,
}

pub fn classify_title(title: &str) -> ReportKind {
    if title.starts_with("IOL") {
        match title {
            "IOL-Haigis" => ReportKind::Iol(IolLayout::Haigis),
            "IOL-Holladay-1" | "IOL-SRK-T" => ReportKind::Iol(IolLayout::HolladaySrkT),
            _ => ReportKind::IolUnknown,
        }
    } else if title == "MMT-Full" {
        ReportKind::MmtFull
    } else {
        ReportKind::Unrecognized
    }
}

/// Route a document to the extractor matching its title.
///
/// Unknown titles yield a `filename`/`title`-only record plus a warning.
/// Errors are reserved for structural problems that make the file unusable.
pub fn parse_document(
    filename: &str,
    doc: &Document,
    options: &ExtractOptions,
    bold: &BoldMarker,
) -> Result<ParsedReport, BiometryError> {
    let kind = classify_title(&doc.title);
    tracing::debug!(filename, title = %doc.title, ?kind, "classified report");

    let report = match kind {
        ReportKind::Iol(layout) => {
            let spans = first_page_spans(doc)?;
            Report::Iol(parse_iol(filename, &doc.title, layout, spans, bold)?)
        }
        ReportKind::MmtFull => {
            let spans = first_page_spans(doc)?;
            Report::Mmt(parse_mmt(filename, &doc.title, spans, options))
        }
        ReportKind::IolUnknown => {
            return Ok(unrecognized(
                filename,
                &doc.title,
                WarningKind::UnrecognizedSubVariant,
                format!("IOL report layout '{}' is not supported", doc.title),
            ));
        }
        ReportKind::Unrecognized => {
            return Ok(unrecognized(
                filename,
                &doc.title,
                WarningKind::UnrecognizedReport,
                format!("report type '{}' is not supported", doc.title),
            ));
        }
    };

    Ok(ParsedReport {
        report,
        warnings: Vec::new(),
    })
}

fn first_page_spans(doc: &Document) -> Result<&[TextSpan], BiometryError> {
    doc.pages
        .first()
        .map(|p| p.spans.as_slice())
        .ok_or(BiometryError::EmptyDocument)
}

fn unrecognized(filename: &str, title: &str, kind: WarningKind, message: String) -> ParsedReport {
    tracing::warn!(filename, "{message}");
    ParsedReport {
        report: Report::Unrecognized(UnrecognizedReport {
            filename: filename.to_string(),
            title: title.to_string(),
        }),
        warnings: vec![ParseWarning { kind, message }],
    }
}

fn header_fields(table: &RegionTable, spans: &[TextSpan]) -> Fields {
    let mut header = extract_key_values(&table.select("header_1", spans));
    header.extend(extract_key_values(&table.select("header_2", spans)));
    header
}

fn parse_iol(
    filename: &str,
    title: &str,
    layout: IolLayout,
    spans: &[TextSpan],
    bold: &BoldMarker,
) -> Result<IolReport, BiometryError> {
    let table = match layout {
        IolLayout::Haigis => tables::iol_haigis(),
        IolLayout::HolladaySrkT => tables::iol_holladay_srkt(),
    };

    let header = header_fields(&table, spans);
    let [od, os] = EYES.map(|eye| parse_iol_eye(eye, &table, spans, bold));

    Ok(IolReport {
        filename: filename.to_string(),
        title: title.to_string(),
        layout,
        header,
        od: od?,
        os: os?,
    })
}

fn parse_iol_eye(
    eye: &str,
    table: &RegionTable,
    spans: &[TextSpan],
    bold: &BoldMarker,
) -> Result<IolEye, BiometryError> {
    let mut result = IolEye {
        fields: extract_key_values(&table.select(&format!("{eye}_header"), spans)),
        lenses: Vec::new(),
    };
    for i in 1..=LENS_REGIONS_PER_EYE {
        let region = format!("{eye}_lens_{i}");
        let lens = extract_lens(&region, &table.select(&region, spans), bold)?;
        result.insert_lens(lens);
    }
    Ok(result)
}

fn parse_mmt(
    filename: &str,
    title: &str,
    spans: &[TextSpan],
    options: &ExtractOptions,
) -> MmtReport {
    let table = tables::mmt_full();
    let tolerance = options.line_tolerance;

    let mut regions = Fields::new();
    if options.dump_regions {
        for region in table.regions() {
            let selected = table.select(&region.name, spans);
            for (i, line) in group_lines_tolerant(&selected, tolerance).iter().enumerate() {
                regions.insert(format!("region_{}_{i}", region.name), line.joined());
            }
        }
    }

    MmtReport {
        filename: filename.to_string(),
        title: title.to_string(),
        header: header_fields(&table, spans),
        od: extract_measurements(&table.select("od_measurements", spans), tolerance),
        os: extract_measurements(&table.select("os_measurements", spans), tolerance),
        regions,
    }
}
