//! Form intake and normalization
//!
//! HTML forms deliver everything as strings, with checkboxes that simply
//! vanish when unchecked and numeric fields the user may leave half-typed.
//! This module turns a raw urlencoded body into explicit typed submissions
//! with one documented fallback rule per field:
//!
//! - boolean flags: "true"/"1"/"yes"/"on" in any case are true; any other
//!   present value is false; an absent key keeps the stored value.
//! - optional integers/decimals: malformed or absent input keeps the stored
//!   value, never a hard error.
//! - multiline fields: split into trimmed non-empty lines, order preserved.
//!
//! Missing client and project name on creation are hard validation
//! failures, handled by the caller.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{BuildingType, ClientTitle, Quote, TimeUnit};

/// Maximum number of additional-note slots on the detail form.
pub const MAX_NOTES: usize = 10;

// ============================================================================
// Raw form data
// ============================================================================

/// Parsed urlencoded form body, preserving repeated keys in order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn parse(body: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Last value submitted under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values submitted under `key`, in submission order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value under `key`, dropped when empty or absent.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

// ============================================================================
// Field normalization
// ============================================================================

/// Split a multiline field into trimmed, non-empty lines, order preserved.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Normalize a checkbox/boolean encoding. Case-insensitive.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Boolean flag with retain-on-absent semantics: an absent key means the
/// form did not carry the field, so the stored value stands.
pub fn bool_field(form: &FormData, key: &str, current: bool) -> bool {
    match form.get(key) {
        Some(value) => parse_bool(value),
        None => current,
    }
}

/// Non-negative integer field; anything that is not all digits keeps the
/// stored value.
pub fn int_field(form: &FormData, key: &str, current: i64) -> i64 {
    match form.get(key) {
        Some(raw) => {
            let raw = raw.trim();
            if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
                raw.parse().unwrap_or(current)
            } else {
                current
            }
        }
        None => current,
    }
}

/// Decimal field with the same retain-on-malformed rule.
pub fn decimal_field(form: &FormData, key: &str, current: Decimal) -> Decimal {
    match form.get_nonempty(key) {
        Some(raw) => Decimal::from_str(raw).unwrap_or(current),
        None => current,
    }
}

// ============================================================================
// Creation form
// ============================================================================

/// Fields for a client created inline on the quote form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub title: Option<ClientTitle>,
    pub full_name: String,
    pub position: String,
    pub company: String,
    pub city: String,
    pub email: String,
    pub phone: String,
}

/// Typed view of the quote-creation submission.
#[derive(Debug, Clone)]
pub struct QuoteCreateForm {
    /// Id of an existing client picked from the dropdown
    pub existing_client: Option<i64>,
    /// Inline new client; only present when both name and company were filled
    pub new_client: Option<NewClient>,
    pub project_name: Option<String>,

    pub is_detection: bool,
    pub is_protection: bool,
    pub is_human_safety: bool,
    pub deliver_autocad: bool,
    pub deliver_revit: bool,

    pub delivery_time_value: i64,
    pub delivery_time_unit: TimeUnit,
}

impl QuoteCreateForm {
    pub fn from_form(form: &FormData) -> Self {
        let new_client = match (
            form.get_nonempty("new_client_name"),
            form.get_nonempty("new_client_company"),
        ) {
            (Some(name), Some(company)) => Some(NewClient {
                title: form
                    .get("new_client_title")
                    .and_then(ClientTitle::from_key),
                full_name: name.to_string(),
                position: form.get("new_client_position").unwrap_or("").to_string(),
                company: company.to_string(),
                city: form.get("new_client_city").unwrap_or("").to_string(),
                email: form.get("new_client_email").unwrap_or("").to_string(),
                phone: form.get("new_client_phone").unwrap_or("").to_string(),
            }),
            _ => None,
        };

        Self {
            existing_client: form
                .get_nonempty("existing_client")
                .and_then(|v| v.parse().ok()),
            new_client,
            project_name: form.get_nonempty("project_name").map(String::from),
            is_detection: bool_field(form, "is_detection", false),
            is_protection: bool_field(form, "is_protection", false),
            is_human_safety: bool_field(form, "is_human_safety", false),
            deliver_autocad: bool_field(form, "deliver_autocad", false),
            deliver_revit: bool_field(form, "deliver_revit", false),
            delivery_time_value: int_field(form, "delivery_time_value", 0),
            delivery_time_unit: form
                .get("delivery_time_unit")
                .and_then(TimeUnit::from_key)
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Details form
// ============================================================================

/// Typed view of the quote-details submission, resolved against the stored
/// quote so every field already carries its effective value.
#[derive(Debug, Clone)]
pub struct QuoteDetailsForm {
    pub requirements: Vec<String>,
    pub items_human_safety: Vec<String>,
    pub items_protection: Vec<String>,
    pub items_detection: Vec<String>,
    /// Request-scoped: rendered into the document, not persisted.
    pub additional_notes: Vec<String>,
    /// Norm ids explicitly ticked; empty means "fall back to defaults".
    pub selected_norm_ids: Vec<i64>,

    pub is_detection: bool,
    pub is_protection: bool,
    pub is_human_safety: bool,
    pub deliver_autocad: bool,
    pub deliver_revit: bool,

    pub building_type: Option<BuildingType>,
    pub area_sqm: Option<Decimal>,

    pub payment_advance: i64,
    pub payment_first_version: i64,
    pub payment_final: i64,

    pub delivery_time_value: i64,
    pub delivery_time_unit: TimeUnit,

    pub value_protection: Decimal,
    pub value_detection: Decimal,
    pub value_human_safety: Decimal,
    pub total_value: Decimal,
}

impl QuoteDetailsForm {
    pub fn from_form(form: &FormData, quote: &Quote) -> Self {
        let notes_count = int_field(form, "notes_count", 0).min(MAX_NOTES as i64);
        let additional_notes = (1..=notes_count)
            .filter_map(|i| {
                form.get(&format!("note_{i}"))
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
            })
            .collect();

        let selected_norm_ids = form
            .get_all("selected_norms")
            .filter_map(|v| {
                let v = v.trim();
                (!v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
                    .then(|| v.parse().ok())
                    .flatten()
            })
            .collect();

        Self {
            requirements: parse_lines(form.get("manual_requirements").unwrap_or("")),
            items_human_safety: parse_lines(form.get("manual_items_sh").unwrap_or("")),
            items_protection: parse_lines(form.get("manual_items_protection").unwrap_or("")),
            items_detection: parse_lines(form.get("manual_items_detection").unwrap_or("")),
            additional_notes,
            selected_norm_ids,

            is_detection: bool_field(form, "is_detection", quote.is_detection),
            is_protection: bool_field(form, "is_protection", quote.is_protection),
            is_human_safety: bool_field(form, "is_human_safety", quote.is_human_safety),
            deliver_autocad: bool_field(form, "deliver_autocad", quote.deliver_autocad),
            deliver_revit: bool_field(form, "deliver_revit", quote.deliver_revit),

            building_type: match form.get("building_type") {
                Some(raw) => BuildingType::from_key(raw.trim()).or(quote.building_type),
                None => quote.building_type,
            },
            area_sqm: match form.get_nonempty("area_sqm") {
                Some(raw) => Decimal::from_str(raw).ok().or(quote.area_sqm),
                None => quote.area_sqm,
            },

            payment_advance: int_field(form, "payment_advance", quote.payment_advance),
            payment_first_version: int_field(
                form,
                "payment_first_version",
                quote.payment_first_version,
            ),
            payment_final: int_field(form, "payment_final", quote.payment_final),

            delivery_time_value: int_field(form, "delivery_time_value", quote.delivery_time_value),
            delivery_time_unit: form
                .get_nonempty("delivery_time_unit")
                .and_then(TimeUnit::from_key)
                .unwrap_or(quote.delivery_time_unit),

            value_protection: decimal_field(form, "value_protection", quote.value_protection),
            value_detection: decimal_field(form, "value_detection", quote.value_detection),
            value_human_safety: decimal_field(form, "value_human_safety", quote.value_human_safety),
            total_value: decimal_field(form, "total_value", quote.total_value),
        }
    }

    /// Write the resolved values back onto the quote.
    ///
    /// A payment split that does not add up to 100 is accepted but logged;
    /// the three percentages are independent fields.
    pub fn apply(&self, quote: &mut Quote) {
        quote.is_detection = self.is_detection;
        quote.is_protection = self.is_protection;
        quote.is_human_safety = self.is_human_safety;
        quote.deliver_autocad = self.deliver_autocad;
        quote.deliver_revit = self.deliver_revit;

        quote.building_type = self.building_type;
        quote.area_sqm = self.area_sqm;

        quote.manual_requirements = self.requirements.join("\n");
        quote.manual_items_sh = self.items_human_safety.join("\n");
        quote.manual_items_detection = self.items_detection.join("\n");
        quote.manual_items_protection = self.items_protection.join("\n");

        let payment_sum = self.payment_advance + self.payment_first_version + self.payment_final;
        if payment_sum != 100 {
            tracing::warn!(
                quote_id = quote.id,
                payment_sum,
                "payment split does not add up to 100%"
            );
        }
        quote.payment_advance = self.payment_advance;
        quote.payment_first_version = self.payment_first_version;
        quote.payment_final = self.payment_final;

        quote.delivery_time_value = self.delivery_time_value;
        quote.delivery_time_unit = self.delivery_time_unit;

        quote.value_protection = self.value_protection;
        quote.value_detection = self.value_detection;
        quote.value_human_safety = self.value_human_safety;
        quote.total_value = self.total_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote() -> Quote {
        Quote {
            id: 1,
            client_id: 1,
            project_name: "Torre Norte".into(),
            is_detection: true,
            is_protection: false,
            is_human_safety: true,
            deliver_autocad: false,
            deliver_revit: false,
            building_type: None,
            area_sqm: None,
            manual_requirements: String::new(),
            manual_items_sh: String::new(),
            manual_items_detection: String::new(),
            manual_items_protection: String::new(),
            payment_advance: 40,
            payment_first_version: 40,
            payment_final: 20,
            delivery_time_value: 3,
            delivery_time_unit: TimeUnit::Weeks,
            value_protection: Decimal::ZERO,
            value_detection: Decimal::ZERO,
            value_human_safety: Decimal::ZERO,
            total_value: Decimal::ZERO,
            generated_doc: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parse_lines_strips_blanks_and_preserves_order() {
        assert_eq!(parse_lines("a\n\nb \n"), vec!["a", "b"]);
        assert_eq!(parse_lines(""), Vec::<String>::new());
        assert_eq!(parse_lines("  \n\t\n"), Vec::<String>::new());
    }

    #[test]
    fn parse_lines_is_idempotent_on_trimmed_input() {
        let once = parse_lines("uno\ndos\ntres");
        let again = parse_lines(&once.join("\n"));
        assert_eq!(once, again);
    }

    #[test]
    fn bool_encodings_normalize_case_insensitively() {
        for v in ["on", "On", "1", "true", "TRUE", "yes"] {
            assert!(parse_bool(v), "{v} should be true");
        }
        for v in ["false", "0", "", "off", "no"] {
            assert!(!parse_bool(v), "{v} should be false");
        }
    }

    #[test]
    fn absent_bool_keeps_stored_value() {
        let form = FormData::from_pairs([("is_protection", "on")]);
        // present → parsed
        assert!(bool_field(&form, "is_protection", false));
        // absent → prior value unchanged, not false
        assert!(bool_field(&form, "is_detection", true));
        assert!(!bool_field(&form, "deliver_revit", false));
    }

    #[test]
    fn malformed_int_keeps_stored_value() {
        let form = FormData::from_pairs([
            ("payment_advance", "fifty"),
            ("payment_final", "30"),
            ("delivery_time_value", "-2"),
        ]);
        assert_eq!(int_field(&form, "payment_advance", 40), 40);
        assert_eq!(int_field(&form, "payment_final", 20), 30);
        // signs fail the all-digits check, like the rest of malformed input
        assert_eq!(int_field(&form, "delivery_time_value", 5), 5);
        assert_eq!(int_field(&form, "missing", 7), 7);
    }

    #[test]
    fn create_form_requires_name_and_company_for_new_client() {
        let form = FormData::from_pairs([("new_client_name", "Ana"), ("project_name", "P1")]);
        let parsed = QuoteCreateForm::from_form(&form);
        assert!(parsed.new_client.is_none());

        let form = FormData::from_pairs([
            ("new_client_name", "Ana"),
            ("new_client_company", "ACME"),
            ("new_client_title", "ingeniero"),
        ]);
        let parsed = QuoteCreateForm::from_form(&form);
        let client = parsed.new_client.expect("client data complete");
        assert_eq!(client.full_name, "Ana");
        assert_eq!(client.title, Some(ClientTitle::Ingeniero));
    }

    #[test]
    fn details_form_resolves_against_stored_quote() {
        let q = quote();
        let form = FormData::from_pairs([
            ("manual_requirements", "a\n\nb \n"),
            ("is_protection", "on"),
            ("payment_advance", "50"),
            ("delivery_time_unit", "months"),
        ]);
        let details = QuoteDetailsForm::from_form(&form, &q);

        assert_eq!(details.requirements, vec!["a", "b"]);
        assert!(details.is_protection);
        // absent flags keep the quote's stored state
        assert!(details.is_detection);
        assert!(details.is_human_safety);
        assert!(!details.deliver_autocad);
        assert_eq!(details.payment_advance, 50);
        assert_eq!(details.payment_first_version, 40);
        assert_eq!(details.delivery_time_unit, TimeUnit::Months);
        assert_eq!(details.delivery_time_value, 3);
    }

    #[test]
    fn notes_collect_in_order_and_skip_blanks() {
        let q = quote();
        let form = FormData::from_pairs([
            ("notes_count", "4"),
            ("note_1", "primera"),
            ("note_2", "  "),
            ("note_3", "tercera"),
        ]);
        let details = QuoteDetailsForm::from_form(&form, &q);
        assert_eq!(details.additional_notes, vec!["primera", "tercera"]);
    }

    #[test]
    fn selected_norms_ignore_non_numeric_ids() {
        let q = quote();
        let form = FormData::from_pairs([
            ("selected_norms", "1"),
            ("selected_norms", "abc"),
            ("selected_norms", "3"),
        ]);
        let details = QuoteDetailsForm::from_form(&form, &q);
        assert_eq!(details.selected_norm_ids, vec![1, 3]);
    }

    #[test]
    fn apply_persists_items_and_flags() {
        let mut q = quote();
        let form = FormData::from_pairs([
            ("manual_items_sh", "extintor\nseñalización"),
            ("is_detection", "false"),
            ("total_value", "1250.50"),
        ]);
        let details = QuoteDetailsForm::from_form(&form, &q);
        details.apply(&mut q);

        assert_eq!(q.manual_items_sh, "extintor\nseñalización");
        assert!(!q.is_detection);
        assert_eq!(q.total_value, Decimal::from_str("1250.50").unwrap());
    }
}
