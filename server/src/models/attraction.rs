use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use super::opening_hours::{validate_opening_hours, OpeningHours};
use super::ticket::{NewTicket, Ticket};

/// Approval state. Only the external review process moves an attraction past
/// its initial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attraction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttractionStatus {
    Draft,
    Pending,
    Approved,
    Declined,
}

impl AttractionStatus {
    /// Every new attraction starts here, whatever the caller sent.
    pub const INITIAL: AttractionStatus = AttractionStatus::Pending;
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attraction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub status: AttractionStatus,
    pub opening_hours: Option<Json<OpeningHours>>,
    pub image_url: Option<String>,
    pub barcode_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttractionWithTickets {
    #[serde(flatten)]
    pub attraction: Attraction,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAttraction {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Short description is required"))]
    pub short_description: String,
    #[validate(length(min = 1, message = "Long description is required"))]
    pub long_description: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(custom(function = "validate_opening_hours"))]
    pub opening_hours: Option<OpeningHours>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(url)]
    pub barcode_url: Option<String>,
}

/// The multi-step creation form: attraction details plus its first tickets.
/// A `status` key in the payload is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_has_tickets"))]
pub struct CreateAttraction {
    #[serde(flatten)]
    #[validate(nested)]
    pub attraction: NewAttraction,
    #[validate(nested)]
    pub tickets: Vec<NewTicket>,
}

fn validate_has_tickets(input: &CreateAttraction) -> Result<(), ValidationError> {
    if input.tickets.is_empty() {
        let mut error = ValidationError::new("tickets");
        error.message = Some("At least one ticket is required".into());
        return Err(error);
    }
    Ok(())
}

/// Partial update from the edit dialog. Status is not editable here.
///
/// The optional columns distinguish an absent key (`None`, keep the stored
/// value) from an explicit `null` (`Some(None)`, clear it).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_optional_columns"))]
pub struct UpdateAttraction {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Short description is required"))]
    pub short_description: Option<String>,
    #[validate(length(min = 1, message = "Long description is required"))]
    pub long_description: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: Option<String>,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub opening_hours: Option<Option<OpeningHours>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub barcode_url: Option<Option<String>>,
}

/// A present key becomes `Some`, so `null` reads as `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_optional_columns(input: &UpdateAttraction) -> Result<(), ValidationError> {
    if let Some(Some(hours)) = &input.opening_hours {
        validate_opening_hours(hours)?;
    }
    let urls = [
        ("image_url", &input.image_url),
        ("barcode_url", &input.barcode_url),
    ];
    for (field, value) in urls {
        if let Some(Some(url)) = value {
            if !url.validate_url() {
                let mut error = ValidationError::new("url");
                error.message = Some(format!("{field} must be a valid URL").into());
                return Err(error);
            }
        }
    }
    Ok(())
}

/// Status tab of the attraction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Pending,
    Approved,
    Declined,
}

impl StatusFilter {
    pub fn status(self) -> Option<AttractionStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Draft => Some(AttractionStatus::Draft),
            StatusFilter::Pending => Some(AttractionStatus::Pending),
            StatusFilter::Approved => Some(AttractionStatus::Approved),
            StatusFilter::Declined => Some(AttractionStatus::Declined),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    /// Last update time.
    #[default]
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListAttractions {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub include_tickets: bool,
}

impl ListAttractions {
    /// `ORDER BY` clause; only ever built from the enums above.
    pub fn order_by(&self) -> &'static str {
        match (self.sort, self.direction) {
            (SortField::Name, SortDirection::Asc) => "name ASC, id ASC",
            (SortField::Name, SortDirection::Desc) => "name DESC, id DESC",
            (SortField::Date, SortDirection::Asc) => "updated_at ASC, id ASC",
            (SortField::Date, SortDirection::Desc) => "updated_at DESC, id DESC",
        }
    }
}

#[cfg(test)]
pub(crate) fn dolphin_feeding() -> CreateAttraction {
    use super::opening_hours::standard_week;
    use super::ticket::adult_ticket;

    CreateAttraction {
        attraction: NewAttraction {
            name: "Dolphin Feeding".to_string(),
            short_description: "Feed the dolphins".to_string(),
            long_description: "Join our keepers for the afternoon feeding session.".to_string(),
            address: "123 Zoo Street".to_string(),
            city: "Amsterdam".to_string(),
            country: "Netherlands".to_string(),
            opening_hours: Some(standard_week()),
            image_url: None,
            barcode_url: None,
        },
        tickets: vec![adult_ticket()],
    }
}
