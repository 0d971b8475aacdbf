use serde::Deserialize;
use serde_json::{json, Value};

/// Writer recorded against every row the importer touches.
pub const UPDATED_BY: &str = "system_import";

/// One row of the RAMQ csv export, keyed by the header line.
///
/// Every column is read as a string, an empty cell stays an empty string.
/// A file whose header is missing any of these columns fails to deserialize
/// which aborts the whole run.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvCodeRow {
    pub billing_code: String,
    pub place: String,
    pub description: String,
    pub unit_require: String,
    pub tariff_value: String,
    pub extra_unit_value: String,
    pub source_file: String,
    pub top_level: String,
    pub level1_group: String,
    pub level2_group: String,
    pub leaf: String,
    pub indicators: String,
    pub anchor_id: String,
}

/// A row ready to be upserted into the `codes` table.
#[derive(Debug, Clone)]
pub struct CodeRecord {
    pub code: String,
    pub description: String,
    pub category: String,
    pub active: bool,
    pub custom_fields: Value,
}

impl CodeRecord {
    /// Maps a csv row onto the `codes` schema.
    ///
    /// The unique key is the billing code suffixed with the place of service
    /// unless the code applies everywhere. The csv encodes "does NOT require
    /// a unit" as `FALSE`, which is exactly what marks a code active here -
    /// the inversion is deliberate and must not be corrected.
    pub fn from_csv_row(row: &CsvCodeRow) -> Self {
        let place = if row.place.is_empty() { "all".to_string() } else { row.place.clone() };

        let code = if place == "all" {
            row.billing_code.clone()
        } else {
            format!("{}-{}", row.billing_code, place)
        };

        CodeRecord {
            code,
            description: row.description.clone(),
            category: place.clone(),
            active: row.unit_require == "FALSE",
            custom_fields: json!({
                "billing_code": row.billing_code,
                "place": place,
                "tariff_value": row.tariff_value,
                "extra_unit_value": row.extra_unit_value,
                "source_file": row.source_file,
                "top_level": row.top_level,
                "level1_group": row.level1_group,
                "level2_group": row.level2_group,
                "leaf": row.leaf,
                "indicators": row.indicators,
                "anchor_id": row.anchor_id,
            }),
        }
    }
}
