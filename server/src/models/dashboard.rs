use serde::Serialize;

use super::attraction::{Attraction, AttractionStatus};

/// Figures shown on the partner's landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub company_name: String,
    pub total_attractions: i64,
    /// Attractions the review process has approved.
    pub active_attractions: i64,
    pub total_tickets: i64,
}

impl DashboardStats {
    pub fn new(company_name: String, attractions: &[Attraction], total_tickets: i64) -> Self {
        let active = attractions
            .iter()
            .filter(|a| a.status == AttractionStatus::Approved)
            .count();

        Self {
            company_name,
            total_attractions: attractions.len() as i64,
            active_attractions: active as i64,
            total_tickets,
        }
    }
}
