//! Domain records: clients, norms, templates, and the quote aggregate.
//!
//! Enum fields are stored as short keys in the database and carry the
//! Spanish display forms used in rendered documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Display enums
// ============================================================================

/// Courtesy title for a client contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientTitle {
    Ingeniero,
    Arquitecto,
    Senior,
}

impl ClientTitle {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ingeniero" => Some(Self::Ingeniero),
            "arquitecto" => Some(Self::Arquitecto),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Ingeniero => "ingeniero",
            Self::Arquitecto => "arquitecto",
            Self::Senior => "senior",
        }
    }

    /// Form used in generated documents
    pub fn display(&self) -> &'static str {
        match self {
            Self::Ingeniero => "Ingeniero(a)",
            Self::Arquitecto => "Arquitecto(a)",
            Self::Senior => "Señor(a)",
        }
    }
}

/// Unit for the quoted delivery time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "days" => Some(Self::Days),
            "weeks" => Some(Self::Weeks),
            "months" => Some(Self::Months),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::Days => "Días",
            Self::Weeks => "Semanas",
            Self::Months => "Meses",
        }
    }
}

/// Building category for the quoted project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    Residential,
    Commercial,
}

impl BuildingType {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "residential" => Some(Self::Residential),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::Residential => "Residencial",
            Self::Commercial => "Comercial",
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A client contact. Created on first use, referenced by quotes, never
/// deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub title: Option<ClientTitle>,
    pub full_name: String,
    pub position: String,
    pub company: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Title display form, empty when no title is set.
    pub fn title_display(&self) -> &'static str {
        self.title.map(|t| t.display()).unwrap_or("")
    }
}

/// A cited technical reference standard (e.g. "NFPA 13"), applicable to one
/// or more services. Read-mostly reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Norm {
    pub id: i64,
    pub code: String,
    pub description: String,
    /// Service tags this norm applies to ("detection", "protection", ...)
    pub services: Vec<String>,
    pub default_selected: bool,
}

/// Metadata for a Word template file, keyed by file name. Populated by the
/// offline loader, read by nothing at request time (the renderer resolves
/// files on disk); kept for the admin inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDoc {
    pub id: i64,
    pub name: String,
    pub services_tag: String,
    pub formats_tag: String,
}

/// The quote aggregate: one client, selected services and delivery formats,
/// itemized requirements, payment split, delivery time, and monetary values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub client_id: i64,
    pub project_name: String,

    pub is_detection: bool,
    pub is_protection: bool,
    pub is_human_safety: bool,
    pub deliver_autocad: bool,
    pub deliver_revit: bool,

    pub building_type: Option<BuildingType>,
    pub area_sqm: Option<Decimal>,

    /// Multiline item fields, one item per line
    pub manual_requirements: String,
    pub manual_items_sh: String,
    pub manual_items_detection: String,
    pub manual_items_protection: String,

    /// Payment split percentages. Independent fields; the sum is not
    /// enforced (logged at warn level when it drifts from 100).
    pub payment_advance: i64,
    pub payment_first_version: i64,
    pub payment_final: i64,

    pub delivery_time_value: i64,
    pub delivery_time_unit: TimeUnit,

    pub value_protection: Decimal,
    pub value_detection: Decimal,
    pub value_human_safety: Decimal,
    pub total_value: Decimal,

    /// Path of the last generated document, if any
    pub generated_doc: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Human-facing quote number, e.g. "COT007-26".
    ///
    /// The two-digit year comes from the creation date.
    pub fn number(&self) -> String {
        format!("COT{:03}-{}", self.id, self.created_at.format("%y"))
    }

    /// True when no service at all is selected; generation must be refused.
    pub fn no_services_selected(&self) -> bool {
        !self.is_detection && !self.is_protection && !self.is_human_safety
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_round_trips_through_key() {
        for title in [
            ClientTitle::Ingeniero,
            ClientTitle::Arquitecto,
            ClientTitle::Senior,
        ] {
            assert_eq!(ClientTitle::from_key(title.key()), Some(title));
        }
        assert_eq!(ClientTitle::from_key(""), None);
        assert_eq!(ClientTitle::from_key("doctor"), None);
    }

    #[test]
    fn time_unit_display_is_spanish() {
        assert_eq!(TimeUnit::Days.display(), "Días");
        assert_eq!(TimeUnit::Weeks.display(), "Semanas");
        assert_eq!(TimeUnit::Months.display(), "Meses");
    }
}
