//! Form drafts and the comma-separated label codec.
//!
//! Services and certifications are edited as free text. The codec splits on
//! commas, trims each token and drops empty ones; a label that itself contains
//! a comma therefore becomes two labels.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::model::{Installer, InstallerFields, PriceTier, QuoteRequestPayload};

const LABEL_SEPARATOR: &str = ", ";

/// Split `"Residential Solar, Battery Storage"` into its labels.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_labels`] for labels without embedded commas.
pub fn join_labels(labels: &[String]) -> String {
    labels.join(LABEL_SEPARATOR)
}

fn required(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw text of the admin installer form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerForm {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub website: String,
    pub rating: String,
    pub years_in_business: String,
    pub certifications: String,
    pub services: String,
    pub price_range: String,
    pub image_url: String,
}

impl Default for InstallerForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl InstallerForm {
    /// The "Add New Installer" form.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            phone: String::new(),
            website: String::new(),
            rating: "4.5".to_string(),
            years_in_business: "1".to_string(),
            certifications: String::new(),
            services: String::new(),
            price_range: PriceTier::default().symbol().to_string(),
            image_url: String::new(),
        }
    }

    /// Pre-populate the form from an existing record.
    pub fn from_installer(installer: &Installer) -> Self {
        Self {
            name: installer.name.clone(),
            description: installer.description.clone(),
            phone: installer.phone.clone(),
            website: installer.website.clone().unwrap_or_default(),
            rating: installer.rating.to_string(),
            years_in_business: installer.years_in_business.to_string(),
            certifications: join_labels(&installer.certifications),
            services: join_labels(&installer.services),
            price_range: installer.price_range.symbol().to_string(),
            image_url: installer.image_url.clone().unwrap_or_default(),
        }
    }

    /// Validate and convert into the store payload.
    pub fn to_fields(&self) -> Result<InstallerFields> {
        required(&self.name, "name")?;
        required(&self.phone, "phone")?;
        required(&self.description, "description")?;
        required(&self.rating, "rating")?;
        required(&self.years_in_business, "years_in_business")?;
        required(&self.price_range, "price_range")?;
        required(&self.services, "services")?;
        required(&self.certifications, "certifications")?;

        let rating: f64 = self
            .rating
            .trim()
            .parse()
            .map_err(|_| ValidationError::NotANumber {
                field: "rating",
                value: self.rating.clone(),
            })?;
        if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: 1.0,
                max: 5.0,
            });
        }

        let years_in_business: u32 =
            self.years_in_business
                .trim()
                .parse()
                .map_err(|_| ValidationError::NotANumber {
                    field: "years_in_business",
                    value: self.years_in_business.clone(),
                })?;

        let price_range: PriceTier = self.price_range.parse()?;

        Ok(InstallerFields {
            name: self.name.clone(),
            description: self.description.clone(),
            phone: self.phone.clone(),
            website: optional(&self.website),
            rating,
            years_in_business,
            certifications: split_labels(&self.certifications),
            services: split_labels(&self.services),
            price_range,
            image_url: optional(&self.image_url),
        })
    }
}

/// Raw text of the visitor quote form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl LeadDraft {
    /// Name, address and phone are required; a blank email is absent.
    pub fn validate(&self) -> Result<QuoteRequestPayload> {
        required(&self.name, "name")?;
        required(&self.address, "address")?;
        required(&self.phone, "phone")?;

        Ok(QuoteRequestPayload {
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: optional(&self.email),
        })
    }
}
