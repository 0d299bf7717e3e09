//! Document rendering
//!
//! Builds the flat field→text context for a quote and merges it into the
//! selected Word template. A .docx file is a zip package; the merge reads
//! every entry, substitutes `{{key}}` placeholders inside the text-bearing
//! XML parts (document body, headers, footers), and writes the package
//! back out. Placeholders split across XML runs are not supported;
//! templates are authored with intact placeholders.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::RenderError;
use crate::intake::parse_lines;
use crate::models::{Client, Norm, Quote};

// ============================================================================
// Text formatting
// ============================================================================

/// Month names for the quote date; no process-global locale is touched.
const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Long-form Spanish date, e.g. "07 de agosto de 2026".
pub fn spanish_date(date: NaiveDate) -> String {
    let month = SPANISH_MONTHS[date.month0() as usize];
    format!("{:02} de {} de {}", date.day(), month, date.year())
}

/// Bullet block with a tab after the marker ("-\tItem"), one item per line.
/// Used for requirement/item lists; the tab matches the template's bullet
/// indentation. Items are trimmed and empty ones dropped.
pub fn format_bullets<S: AsRef<str>>(items: &[S], bullet: &str) -> String {
    items
        .iter()
        .map(|i| i.as_ref().trim())
        .filter(|i| !i.is_empty())
        .map(|i| format!("{bullet}\t{i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bullet block with a space after the marker ("- Item"). Used for notes
/// and the payment schedule.
pub fn format_bullets_spaced<S: AsRef<str>>(items: &[S], bullet: &str) -> String {
    items
        .iter()
        .map(|i| i.as_ref().trim())
        .filter(|i| !i.is_empty())
        .map(|i| format!("{bullet} {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a filename component down to alphanumerics, spaces, and
/// underscores, then join words with underscores.
pub fn sanitize_component(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim().replace(' ', "_")
}

/// Download/output file name: `Cotizacion_<client>_<project>.docx`.
pub fn output_filename(client_name: &str, project_name: &str) -> String {
    format!(
        "Cotizacion_{}_{}.docx",
        sanitize_component(client_name),
        sanitize_component(project_name)
    )
}

// ============================================================================
// Context
// ============================================================================

/// Build the flat merge context for a quote.
///
/// Every value is a display string; lists arrive as bullet blocks, money as
/// plain decimal text. `notes` is the request-scoped additional-notes list.
pub fn build_context(
    quote: &Quote,
    client: &Client,
    norms: &[Norm],
    notes: &[String],
    date: NaiveDate,
) -> BTreeMap<String, String> {
    let reference_norms: Vec<String> = norms
        .iter()
        .map(|n| format!("{} {}", n.code, n.description).trim().to_string())
        .collect();

    let payment_schedule = [
        format!("{}% Anticipo", quote.payment_advance),
        format!(
            "{}% Contra entrega de la primera versión del diseño",
            quote.payment_first_version
        ),
        format!("{}% Contra entrega final del diseño", quote.payment_final),
    ];

    let mut context = BTreeMap::new();
    context.insert("quote_date".into(), spanish_date(date));
    context.insert("quote_number".into(), quote.number());

    context.insert("client_city".into(), client.city.clone());
    context.insert("client_company".into(), client.company.clone());
    context.insert("client_title".into(), client.title_display().to_string());
    context.insert("client_name".into(), client.full_name.clone());
    context.insert("client_position".into(), client.position.clone());

    context.insert("project_name".into(), quote.project_name.clone());

    context.insert(
        "reference_norms".into(),
        format_bullets(&reference_norms, "•"),
    );
    context.insert(
        "client_requirements".into(),
        format_bullets(&parse_lines(&quote.manual_requirements), "-"),
    );
    context.insert(
        "items_human_safety".into(),
        format_bullets(&parse_lines(&quote.manual_items_sh), "-"),
    );
    context.insert(
        "items_protection".into(),
        format_bullets(&parse_lines(&quote.manual_items_protection), "-"),
    );
    context.insert(
        "items_detection".into(),
        format_bullets(&parse_lines(&quote.manual_items_detection), "-"),
    );
    context.insert(
        "additional_notes".into(),
        format_bullets_spaced(notes, "-"),
    );
    context.insert(
        "payment_schedule".into(),
        format_bullets_spaced(&payment_schedule, "-"),
    );

    context.insert(
        "delivery_time_text".into(),
        format!(
            "{} {} a partir del pago del anticipo.",
            quote.delivery_time_value,
            quote.delivery_time_unit.display()
        ),
    );

    context.insert("value_protection".into(), quote.value_protection.to_string());
    context.insert("value_detection".into(), quote.value_detection.to_string());
    context.insert(
        "value_human_safety".into(),
        quote.value_human_safety.to_string(),
    );
    context.insert("total_value".into(), quote.total_value.to_string());

    context
}

// ============================================================================
// Merge
// ============================================================================

/// XML parts that carry merge placeholders.
fn is_merge_part(name: &str) -> bool {
    name == "word/document.xml"
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// Escape a context value for insertion into a `<w:t>` run. Newlines become
/// line breaks, tabs become tab elements.
fn xml_value(value: &str) -> String {
    let escaped = value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    escaped
        .replace('\n', "</w:t><w:br/><w:t xml:space=\"preserve\">")
        .replace('\t', "</w:t><w:tab/><w:t xml:space=\"preserve\">")
}

/// Substitute `{{key}}` placeholders (with or without inner padding) in an
/// XML part.
fn substitute(xml: &str, context: &BTreeMap<String, String>) -> String {
    let mut out = xml.to_string();
    for (key, value) in context {
        let replacement = xml_value(value);
        out = out.replace(&format!("{{{{{key}}}}}"), &replacement);
        out = out.replace(&format!("{{{{ {key} }}}}"), &replacement);
    }
    out
}

/// Merge `context` into the template at `template_path`, returning the
/// rendered .docx bytes.
///
/// A missing template file is reported by name so the user can see which
/// service/format combination lacks a template; no partial output is
/// produced on any failure.
pub fn render_docx(
    template_path: &Path,
    context: &BTreeMap<String, String>,
) -> Result<Vec<u8>, RenderError> {
    let display_name = template_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| template_path.display().to_string());

    if !template_path.is_file() {
        return Err(RenderError::TemplateNotFound(display_name));
    }

    let bytes = std::fs::read(template_path)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut raw)?;

        if is_merge_part(&name) {
            let xml = String::from_utf8(raw).map_err(|_| RenderError::MalformedTemplate {
                name: display_name.clone(),
                reason: format!("part {name} is not valid UTF-8"),
            })?;
            writer.start_file(name, options)?;
            writer.write_all(substitute(&xml, context).as_bytes())?;
        } else {
            writer.start_file(name, options)?;
            writer.write_all(&raw)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientTitle, TimeUnit};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn client() -> Client {
        Client {
            id: 4,
            title: Some(ClientTitle::Ingeniero),
            full_name: "Ana María".into(),
            position: "Gerente".into(),
            company: "ACME".into(),
            city: "Bogotá".into(),
            email: String::new(),
            phone: String::new(),
            created_at: Utc::now(),
        }
    }

    fn quote() -> Quote {
        Quote {
            id: 7,
            client_id: 4,
            project_name: "Torre #1".into(),
            is_detection: true,
            is_protection: true,
            is_human_safety: false,
            deliver_autocad: true,
            deliver_revit: false,
            building_type: None,
            area_sqm: None,
            manual_requirements: "sensores\nrociadores".into(),
            manual_items_sh: String::new(),
            manual_items_detection: String::new(),
            manual_items_protection: String::new(),
            payment_advance: 40,
            payment_first_version: 40,
            payment_final: 20,
            delivery_time_value: 3,
            delivery_time_unit: TimeUnit::Weeks,
            value_protection: Decimal::from_str("1500.00").unwrap(),
            value_detection: Decimal::ZERO,
            value_human_safety: Decimal::ZERO,
            total_value: Decimal::from_str("1500.00").unwrap(),
            generated_doc: None,
            created_at: "2025-03-01T10:00:00Z".parse().unwrap(),
        }
    }

    fn write_template(dir: &Path, name: &str, body_xml: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer
            .start_file("[Content_Types].xml", options)
            .unwrap();
        writer
            .write_all(b"<?xml version=\"1.0\"?><Types/>")
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(body_xml.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn document_xml(docx: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx.to_vec())).unwrap();
        let mut entry = archive.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn spanish_date_uses_month_table() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(spanish_date(date), "07 de agosto de 2026");
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(spanish_date(date), "24 de diciembre de 2025");
    }

    #[test]
    fn bullets_tab_variant_drops_empty_items() {
        let block = format_bullets(&["uno", "  ", "dos "], "-");
        assert_eq!(block, "-\tuno\n-\tdos");
        assert_eq!(format_bullets(&[] as &[&str], "-"), "");
    }

    #[test]
    fn bullets_spaced_variant() {
        let block = format_bullets_spaced(&["50% Anticipo"], "-");
        assert_eq!(block, "- 50% Anticipo");
    }

    #[test]
    fn sanitize_drops_non_conforming_characters() {
        assert_eq!(sanitize_component("Ana/María"), "AnaMara");
        assert_eq!(sanitize_component("Torre #1"), "Torre_1");
        assert_eq!(
            output_filename("Ana/María", "Torre #1"),
            "Cotizacion_AnaMara_Torre_1.docx"
        );
    }

    #[test]
    fn context_carries_display_strings() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let norms = [Norm {
            id: 1,
            code: "NFPA 13".into(),
            description: "Rociadores".into(),
            services: vec!["protection".into()],
            default_selected: true,
        }];
        let notes = vec!["Vigencia 30 días".to_string()];
        let context = build_context(&quote(), &client(), &norms, &notes, date);

        assert_eq!(context["quote_number"], "COT007-25");
        assert_eq!(context["quote_date"], "01 de marzo de 2025");
        assert_eq!(context["client_title"], "Ingeniero(a)");
        assert_eq!(context["reference_norms"], "•\tNFPA 13 Rociadores");
        assert_eq!(context["client_requirements"], "-\tsensores\n-\trociadores");
        assert_eq!(context["additional_notes"], "- Vigencia 30 días");
        assert_eq!(
            context["delivery_time_text"],
            "3 Semanas a partir del pago del anticipo."
        );
        assert!(context["payment_schedule"].starts_with("- 40% Anticipo\n"));
        assert_eq!(context["total_value"], "1500.00");
    }

    #[test]
    fn render_substitutes_placeholders_and_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(
            dir.path(),
            "detection_protection_autocad.docx",
            "<w:document><w:t>{{client_name}} &gt; {{project_name}}</w:t></w:document>",
        );

        let mut context = BTreeMap::new();
        context.insert("client_name".to_string(), "Ana & Co".to_string());
        context.insert("project_name".to_string(), "Torre <1>".to_string());

        let rendered = render_docx(&path, &context).unwrap();
        let xml = document_xml(&rendered);
        assert!(xml.contains("Ana &amp; Co"));
        assert!(xml.contains("Torre &lt;1&gt;"));
        assert!(!xml.contains("{{"));
    }

    #[test]
    fn render_maps_newlines_to_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(
            dir.path(),
            "protection.docx",
            "<w:document><w:t>{{client_requirements}}</w:t></w:document>",
        );

        let mut context = BTreeMap::new();
        context.insert(
            "client_requirements".to_string(),
            "-\tuno\n-\tdos".to_string(),
        );

        let xml = document_xml(&render_docx(&path, &context).unwrap());
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains("<w:tab/>"));
    }

    #[test]
    fn missing_template_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("human_safety.docx");
        let err = render_docx(&path, &BTreeMap::new()).unwrap_err();
        match err {
            RenderError::TemplateNotFound(name) => assert_eq!(name, "human_safety.docx"),
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
    }
}
