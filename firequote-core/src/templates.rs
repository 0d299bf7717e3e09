//! Template selection
//!
//! Maps the five service/format booleans to the name of the Word template
//! that carries the matching proposal text, and infers service/format tags
//! back out of a template file name for the offline loader.

/// Format suffixes recognized in template file names.
const FORMAT_TAGS: [&str; 3] = ["autocad", "revit", "both"];

/// Service names that span two underscore segments.
const COMPOUND_SERVICES: [&str; 1] = ["human_safety"];

/// Pick the template file for the given service and delivery-format flags.
///
/// Service flags combine by fixed precedence into one of seven base names;
/// the delivery-format flags append `_both`, `_autocad`, `_revit`, or
/// nothing. Returns `None` when no service is selected: an error condition
/// the caller must surface to the user, never a default.
pub fn template_filename(
    is_detection: bool,
    is_protection: bool,
    is_human_safety: bool,
    deliver_autocad: bool,
    deliver_revit: bool,
) -> Option<String> {
    let base_name = if is_detection && is_protection && is_human_safety {
        "detection_protection_human_safety"
    } else if is_detection && is_protection {
        "detection_protection"
    } else if is_detection && is_human_safety {
        "detection_human_safety"
    } else if is_protection && is_human_safety {
        "protection_human_safety"
    } else if is_detection {
        "detection"
    } else if is_protection {
        "protection"
    } else if is_human_safety {
        "human_safety"
    } else {
        return None;
    };

    let suffix = if deliver_autocad && deliver_revit {
        "_both"
    } else if deliver_autocad {
        "_autocad"
    } else if deliver_revit {
        "_revit"
    } else {
        ""
    };

    Some(format!("{base_name}{suffix}.docx"))
}

/// Service/format tags inferred from a template file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTags {
    /// Pipe-joined service segments, e.g. "detection|protection"
    pub services_tag: String,
    /// "autocad", "revit", "both", or empty for format-neutral templates
    pub formats_tag: String,
}

/// Infer tags from a template file name, e.g.
/// `detection_protection_both.docx` → services "detection|protection",
/// format "both".
///
/// The trailing segment counts as a format tag only when it is one of the
/// known formats; `human_safety.docx` is all service, no format.
pub fn infer_tags(file_name: &str) -> TemplateTags {
    let stem = file_name
        .strip_suffix(".docx")
        .unwrap_or(file_name)
        .trim_matches('_');

    if stem.is_empty() {
        return TemplateTags {
            services_tag: String::new(),
            formats_tag: String::new(),
        };
    }

    let parts: Vec<&str> = stem.split('_').collect();
    let (segments, format) = match parts.last() {
        Some(last) if FORMAT_TAGS.contains(last) => (&parts[..parts.len() - 1], *last),
        _ => (&parts[..], ""),
    };

    // Re-join compound service names split by the underscore scan
    // ("human" + "safety" → "human_safety").
    let mut services: Vec<String> = Vec::new();
    let mut i = 0;
    while i < segments.len() {
        if i + 1 < segments.len() {
            let joined = format!("{}_{}", segments[i], segments[i + 1]);
            if COMPOUND_SERVICES.contains(&joined.as_str()) {
                services.push(joined);
                i += 2;
                continue;
            }
        }
        services.push(segments[i].to_string());
        i += 1;
    }

    TemplateTags {
        services_tag: services.join("|"),
        formats_tag: format.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_services_yields_none_regardless_of_formats() {
        for autocad in [false, true] {
            for revit in [false, true] {
                assert_eq!(template_filename(false, false, false, autocad, revit), None);
            }
        }
    }

    #[test]
    fn pairwise_combination_with_autocad() {
        assert_eq!(
            template_filename(true, true, false, true, false).as_deref(),
            Some("detection_protection_autocad.docx")
        );
    }

    #[test]
    fn all_32_combinations_are_deterministic() {
        // Every non-zero service combination must produce exactly the
        // enumerated name; the zero case must signal instead.
        let services = [
            (false, false, false, None),
            (true, false, false, Some("detection")),
            (false, true, false, Some("protection")),
            (false, false, true, Some("human_safety")),
            (true, true, false, Some("detection_protection")),
            (true, false, true, Some("detection_human_safety")),
            (false, true, true, Some("protection_human_safety")),
            (true, true, true, Some("detection_protection_human_safety")),
        ];
        let formats = [
            (false, false, ""),
            (true, false, "_autocad"),
            (false, true, "_revit"),
            (true, true, "_both"),
        ];

        for (det, prot, sh, base) in services {
            for (autocad, revit, suffix) in formats {
                let got = template_filename(det, prot, sh, autocad, revit);
                match base {
                    None => assert_eq!(got, None),
                    Some(base) => assert_eq!(got.as_deref(), Some(format!("{base}{suffix}.docx").as_str())),
                }
            }
        }
    }

    #[test]
    fn infer_tags_with_format_suffix() {
        let tags = infer_tags("detection_protection_both.docx");
        assert_eq!(tags.services_tag, "detection|protection");
        assert_eq!(tags.formats_tag, "both");
    }

    #[test]
    fn infer_tags_without_format_suffix() {
        // "safety" is not a known format, and "human_safety" is one service.
        let tags = infer_tags("human_safety.docx");
        assert_eq!(tags.services_tag, "human_safety");
        assert_eq!(tags.formats_tag, "");
    }

    #[test]
    fn infer_tags_compound_service_with_format() {
        let tags = infer_tags("detection_human_safety_autocad.docx");
        assert_eq!(tags.services_tag, "detection|human_safety");
        assert_eq!(tags.formats_tag, "autocad");
    }

    #[test]
    fn infer_tags_single_service_with_format() {
        let tags = infer_tags("protection_revit.docx");
        assert_eq!(tags.services_tag, "protection");
        assert_eq!(tags.formats_tag, "revit");
    }

    #[test]
    fn selector_output_round_trips_through_inference() {
        let name = template_filename(true, false, true, false, true).unwrap();
        let tags = infer_tags(&name);
        assert_eq!(tags.formats_tag, "revit");
        assert!(tags.services_tag.contains("detection"));
    }
}
