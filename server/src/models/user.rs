use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::backend::auth::Identity;

/// Role given to every profile created on first sign-in.
pub const DEFAULT_ROLE: &str = "partner";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub company_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The signed-in partner: provider identity plus the profile row.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub identity: Identity,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCompanyName {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
}
