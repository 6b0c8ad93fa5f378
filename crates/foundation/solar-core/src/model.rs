//! Records as they live in the `installers` and `quote_requests` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Price tier shown on every card. Stored as the literal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    #[default]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
}

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [PriceTier::Budget, PriceTier::Moderate, PriceTier::Premium];

    pub fn symbol(self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Premium => "$$$",
        }
    }

    /// Option text in the admin form.
    pub fn label(self) -> &'static str {
        match self {
            PriceTier::Budget => "$ - Budget Friendly",
            PriceTier::Moderate => "$$ - Moderate",
            PriceTier::Premium => "$$$ - Premium",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PriceTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(PriceTier::Budget),
            "$$" => Ok(PriceTier::Moderate),
            "$$$" => Ok(PriceTier::Premium),
            other => Err(ValidationError::UnknownPriceTier(other.to_string())),
        }
    }
}

/// Array columns come back as `null` from some rows; the model never holds an absent list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A listed installer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    pub rating: f64,
    pub years_in_business: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<String>,
    #[serde(default)]
    pub price_range: PriceTier,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Installer {
    /// The writable part of the record, as an edit would resubmit it.
    pub fn fields(&self) -> InstallerFields {
        InstallerFields {
            name: self.name.clone(),
            description: self.description.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            rating: self.rating,
            years_in_business: self.years_in_business,
            certifications: self.certifications.clone(),
            services: self.services.clone(),
            price_range: self.price_range,
            image_url: self.image_url.clone(),
        }
    }
}

/// Insert/update payload for an installer. Optional URLs serialize as `null`
/// so that an update clears them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallerFields {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub website: Option<String>,
    pub rating: f64,
    pub years_in_business: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<String>,
    pub price_range: PriceTier,
    pub image_url: Option<String>,
}

/// A visitor lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// What a visitor submits: the insert row and the email dispatch body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequestPayload {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn installer_json() -> serde_json::Value {
        json!({
            "id": "6f0c",
            "name": "Great Lakes Solar",
            "description": "Residential arrays",
            "phone": "(734) 555-0100",
            "website": null,
            "rating": 4.8,
            "years_in_business": 12,
            "certifications": ["NABCEP Certified"],
            "services": null,
            "price_range": "$$$",
            "image_url": null,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-02T10:00:00Z"
        })
    }

    #[test]
    fn null_lists_become_empty() {
        let installer: Installer = serde_json::from_value(installer_json()).unwrap();
        assert!(installer.services.is_empty());
        assert_eq!(installer.certifications, vec!["NABCEP Certified"]);
        assert_eq!(installer.price_range, PriceTier::Premium);
    }

    #[test]
    fn price_tier_uses_symbols_on_the_wire() {
        assert_eq!(serde_json::to_value(PriceTier::Budget).unwrap(), json!("$"));
        assert_eq!("$$".parse::<PriceTier>().unwrap(), PriceTier::Moderate);
        assert_eq!(
            "€".parse::<PriceTier>(),
            Err(ValidationError::UnknownPriceTier("€".into()))
        );
    }

    #[test]
    fn fields_serialize_absent_urls_as_null() {
        let installer: Installer = serde_json::from_value(installer_json()).unwrap();
        let value = serde_json::to_value(installer.fields()).unwrap();
        assert_eq!(value["website"], serde_json::Value::Null);
        assert_eq!(value["services"], json!([]));
        assert_eq!(value["price_range"], json!("$$$"));
    }

    #[test]
    fn payload_omits_missing_email() {
        let payload = QuoteRequestPayload {
            name: "Ada".into(),
            address: "1 Main St".into(),
            phone: "555".into(),
            email: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("email").is_none());
    }
}
