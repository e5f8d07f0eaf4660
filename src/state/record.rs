//! Record and field definitions
//!
//! A record is a flat, ordered mapping of named fields to strings. The core
//! fields are always present (empty when not located); the optional fields
//! only appear once they carry a value.

use crate::extract::ExtractionError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A named record field
///
/// Declaration order is the fixed output order used by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // ===== Core Fields =====
    Brand,
    Model,
    Year,
    Price,
    Mileage,
    FuelType,
    Transmission,
    EngineSize,
    Color,
    Url,
    Description,

    // ===== Optional Fields =====
    #[serde(rename = "type")]
    Type,
    Warranty,
    Features,
    SafetyFeatures,
    TechFeatures,
    ComfortFeatures,
    DealerLocation,
    Availability,
    DeliveryTime,
}

impl Field {
    /// Fields present on every record, in output order
    pub const CORE: [Field; 11] = [
        Field::Brand,
        Field::Model,
        Field::Year,
        Field::Price,
        Field::Mileage,
        Field::FuelType,
        Field::Transmission,
        Field::EngineSize,
        Field::Color,
        Field::Url,
        Field::Description,
    ];

    /// Fields that only appear when a value was found or configured
    pub const OPTIONAL: [Field; 9] = [
        Field::Type,
        Field::Warranty,
        Field::Features,
        Field::SafetyFeatures,
        Field::TechFeatures,
        Field::ComfortFeatures,
        Field::DealerLocation,
        Field::Availability,
        Field::DeliveryTime,
    ];

    /// Returns true for fields that every record carries
    pub fn is_core(&self) -> bool {
        Self::CORE.contains(self)
    }

    /// Returns the column/key name used by sinks
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Year => "year",
            Self::Price => "price",
            Self::Mileage => "mileage",
            Self::FuelType => "fuel_type",
            Self::Transmission => "transmission",
            Self::EngineSize => "engine_size",
            Self::Color => "color",
            Self::Url => "url",
            Self::Description => "description",
            Self::Type => "type",
            Self::Warranty => "warranty",
            Self::Features => "features",
            Self::SafetyFeatures => "safety_features",
            Self::TechFeatures => "tech_features",
            Self::ComfortFeatures => "comfort_features",
            Self::DealerLocation => "dealer_location",
            Self::Availability => "availability",
            Self::DeliveryTime => "delivery_time",
        }
    }

    /// Returns every field in output order
    pub fn all() -> Vec<Self> {
        Self::CORE.iter().chain(Self::OPTIONAL.iter()).copied().collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One extracted listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<Field, String>,
}

impl Record {
    /// Creates a record for the given brand with every core field empty
    ///
    /// Fails when the brand is blank; a record without a brand is never built.
    pub fn new(brand: &str) -> Result<Self, ExtractionError> {
        let brand = brand.trim();
        if brand.is_empty() {
            return Err(ExtractionError::MissingBrand);
        }

        let mut values: BTreeMap<Field, String> = Field::CORE
            .iter()
            .map(|field| (*field, String::new()))
            .collect();
        values.insert(Field::Brand, brand.to_string());

        Ok(Self { values })
    }

    /// Returns the record with `field` set to `value`
    ///
    /// The brand is fixed at construction and cannot be replaced. Blank values
    /// leave optional fields absent.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        if field == Field::Brand {
            return self;
        }

        let value = value.into();
        if value.is_empty() && !field.is_core() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
        self
    }

    /// Returns the value of a field, or an empty string when absent
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Returns the brand; never empty
    pub fn brand(&self) -> &str {
        self.get(Field::Brand)
    }

    /// Returns true if the field is part of this record
    pub fn has(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Iterates over present fields in output order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.fields() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_core_fields() {
        let record = Record::new("Toyota").unwrap();
        let names: Vec<&str> = record.fields().map(|(f, _)| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "brand",
                "model",
                "year",
                "price",
                "mileage",
                "fuel_type",
                "transmission",
                "engine_size",
                "color",
                "url",
                "description"
            ]
        );
        assert_eq!(record.brand(), "Toyota");
        assert_eq!(record.get(Field::Price), "");
    }

    #[test]
    fn test_blank_brand_rejected() {
        assert!(matches!(
            Record::new("   "),
            Err(ExtractionError::MissingBrand)
        ));
    }

    #[test]
    fn test_brand_cannot_be_overwritten() {
        let record = Record::new("Kia").unwrap().with(Field::Brand, "");
        assert_eq!(record.brand(), "Kia");
    }

    #[test]
    fn test_optional_field_only_when_present() {
        let record = Record::new("Audi").unwrap().with(Field::Warranty, "");
        assert!(!record.has(Field::Warranty));

        let record = record.with(Field::Warranty, "5 years");
        assert!(record.has(Field::Warranty));
        assert_eq!(record.get(Field::Warranty), "5 years");
    }

    #[test]
    fn test_serialize_keeps_field_order() {
        let record = Record::new("BMW")
            .unwrap()
            .with(Field::Features, "Sunroof")
            .with(Field::Type, "New Car")
            .with(Field::Model, "X5");
        let json = serde_json::to_string(&record).unwrap();

        let brand = json.find("\"brand\"").unwrap();
        let model = json.find("\"model\"").unwrap();
        let description = json.find("\"description\"").unwrap();
        let kind = json.find("\"type\"").unwrap();
        let features = json.find("\"features\"").unwrap();
        assert!(brand < model);
        assert!(model < description);
        assert!(description < kind);
        assert!(kind < features);
    }

    #[test]
    fn test_field_count() {
        assert_eq!(Field::all().len(), 20);
    }
}
