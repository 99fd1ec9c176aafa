//! Repository for the `attractions` table and the media attached to it.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::storage::{object_key, Bucket, StorageClient, Upload};
use crate::backend::BackendError;
use crate::models::attraction::{
    Attraction, AttractionStatus, AttractionWithTickets, CreateAttraction, ListAttractions,
    UpdateAttraction,
};
use crate::models::ticket::Ticket;
use crate::repositories::TicketRepo;
use crate::utils::error::{AppError, AppResult};

const COLUMNS: &str = "id, user_id, name, short_description, long_description, address, city, \
     country, status, opening_hours, image_url, barcode_url, created_at, updated_at";

pub struct AttractionRepo;

impl AttractionRepo {
    /// Attractions owned by `user_id`, filtered and ordered per `query`.
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: &ListAttractions,
    ) -> AppResult<Vec<Attraction>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM attractions
             WHERE user_id = $1 AND ($2::attraction_status IS NULL OR status = $2)
             ORDER BY {}",
            query.order_by()
        );
        let attractions = sqlx::query_as::<_, Attraction>(&sql)
            .bind(user_id)
            .bind(query.status.status())
            .fetch_all(pool)
            .await?;
        Ok(attractions)
    }

    /// Same as [`AttractionRepo::list`] with each attraction's tickets attached.
    pub async fn list_with_tickets(
        pool: &PgPool,
        user_id: Uuid,
        query: &ListAttractions,
    ) -> AppResult<Vec<AttractionWithTickets>> {
        let attractions = Self::list(pool, user_id, query).await?;
        let ids: Vec<Uuid> = attractions.iter().map(|a| a.id).collect();
        let tickets = TicketRepo::list_for(pool, &ids).await?;
        Ok(attach_tickets(attractions, tickets))
    }

    pub async fn find(pool: &PgPool, id: Uuid, user_id: Uuid) -> AppResult<AttractionWithTickets> {
        let sql = format!("SELECT {COLUMNS} FROM attractions WHERE id = $1 AND user_id = $2");
        let attraction = sqlx::query_as::<_, Attraction>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("Attraction"))?;

        let tickets = TicketRepo::list_for(pool, &[attraction.id]).await?;
        Ok(AttractionWithTickets {
            attraction,
            tickets,
        })
    }

    /// Writes the attraction and all of its tickets in one transaction.
    ///
    /// The status is always [`AttractionStatus::INITIAL`]. Ticket prices are
    /// parsed before anything is written; if any ticket insert fails the
    /// attraction row is rolled back with it.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: &CreateAttraction,
    ) -> AppResult<AttractionWithTickets> {
        let prices = input
            .tickets
            .iter()
            .map(|t| t.price_decimal())
            .collect::<Result<Vec<_>, _>>()?;

        let fields = &input.attraction;
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO attractions
                (user_id, name, short_description, long_description, address, city, country,
                 status, opening_hours, image_url, barcode_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let attraction = sqlx::query_as::<_, Attraction>(&sql)
            .bind(user_id)
            .bind(&fields.name)
            .bind(&fields.short_description)
            .bind(&fields.long_description)
            .bind(&fields.address)
            .bind(&fields.city)
            .bind(&fields.country)
            .bind(AttractionStatus::INITIAL)
            .bind(fields.opening_hours.clone().map(Json))
            .bind(&fields.image_url)
            .bind(&fields.barcode_url)
            .fetch_one(&mut *tx)
            .await?;

        let mut tickets = Vec::with_capacity(input.tickets.len());
        for (ticket, price) in input.tickets.iter().zip(prices) {
            tickets.push(TicketRepo::insert(&mut *tx, attraction.id, ticket, price).await?);
        }

        tx.commit().await?;

        tracing::info!(
            attraction_id = %attraction.id,
            %user_id,
            tickets = tickets.len(),
            "Attraction created"
        );
        Ok(AttractionWithTickets {
            attraction,
            tickets,
        })
    }

    /// Applies the non-`None` fields of `input` to an attraction owned by `user_id`.
    /// An explicit `null` clears opening hours or a media URL.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        input: &UpdateAttraction,
    ) -> AppResult<Attraction> {
        let sql = format!(
            "UPDATE attractions SET
                name = COALESCE($3, name),
                short_description = COALESCE($4, short_description),
                long_description = COALESCE($5, long_description),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                country = COALESCE($8, country),
                opening_hours = CASE WHEN $12 THEN $9 ELSE opening_hours END,
                image_url = CASE WHEN $13 THEN $10 ELSE image_url END,
                barcode_url = CASE WHEN $14 THEN $11 ELSE barcode_url END,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Attraction>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.short_description)
            .bind(&input.long_description)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.country)
            .bind(input.opening_hours.clone().flatten().map(Json))
            .bind(input.image_url.clone().flatten())
            .bind(input.barcode_url.clone().flatten())
            .bind(input.opening_hours.is_some())
            .bind(input.image_url.is_some())
            .bind(input.barcode_url.is_some())
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(attraction) => {
                tracing::info!(attraction_id = %id, "Attraction updated");
                Ok(attraction)
            }
            None => {
                tracing::warn!(attraction_id = %id, %user_id, "Attraction update denied");
                Err(AppError::not_found_or_denied("Attraction"))
            }
        }
    }

    /// Stores uploaded media URLs on an owned attraction.
    pub async fn attach_media(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        image_url: Option<String>,
        barcode_url: Option<String>,
    ) -> AppResult<Attraction> {
        let input = UpdateAttraction {
            image_url: image_url.map(Some),
            barcode_url: barcode_url.map(Some),
            ..Default::default()
        };
        Self::update(pool, id, user_id, &input).await
    }

    /// Deletes an owned attraction together with its tickets.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM tickets t
             USING attractions a
             WHERE a.id = $1 AND a.user_id = $2 AND t.attraction_id = a.id",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM attractions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::warn!(attraction_id = %id, %user_id, "Attraction delete denied");
            return Err(AppError::not_found_or_denied("Attraction"));
        }

        tx.commit().await?;
        tracing::info!(attraction_id = %id, "Attraction deleted");
        Ok(())
    }

    pub async fn upload_image(
        storage: &StorageClient,
        access_token: &str,
        user_id: Uuid,
        file: &Upload,
    ) -> Result<String, BackendError> {
        upload_to(storage, Bucket::Attractions, access_token, user_id, file).await
    }

    pub async fn upload_barcode(
        storage: &StorageClient,
        access_token: &str,
        user_id: Uuid,
        file: &Upload,
    ) -> Result<String, BackendError> {
        upload_to(storage, Bucket::Barcodes, access_token, user_id, file).await
    }
}

async fn upload_to(
    storage: &StorageClient,
    bucket: Bucket,
    access_token: &str,
    user_id: Uuid,
    file: &Upload,
) -> Result<String, BackendError> {
    let key = object_key(user_id, &file.file_name);
    storage.upload(bucket, &key, file, access_token).await?;
    Ok(storage.public_url(bucket, &key))
}

/// Groups `tickets` under their attraction, keeping the attraction order.
fn attach_tickets(
    attractions: Vec<Attraction>,
    tickets: Vec<Ticket>,
) -> Vec<AttractionWithTickets> {
    let mut by_attraction: HashMap<Uuid, Vec<Ticket>> = HashMap::new();
    for ticket in tickets {
        by_attraction
            .entry(ticket.attraction_id)
            .or_default()
            .push(ticket);
    }

    attractions
        .into_iter()
        .map(|attraction| AttractionWithTickets {
            tickets: by_attraction.remove(&attraction.id).unwrap_or_default(),
            attraction,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn attraction(name: &str) -> Attraction {
        let now = Utc::now();
        Attraction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            short_description: String::new(),
            long_description: String::new(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
            status: AttractionStatus::Pending,
            opening_hours: None,
            image_url: None,
            barcode_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ticket(attraction_id: Uuid) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            attraction_id,
            name: "Child Ticket".to_string(),
            description: String::new(),
            price: Decimal::new(1450, 2),
            currency: "EUR".to_string(),
            validity_start: now,
            validity_end: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_attach_tickets_groups_by_parent_and_keeps_order() {
        let zoo = attraction("Zoo");
        let museum = attraction("Museum");
        let tickets = vec![ticket(museum.id), ticket(zoo.id), ticket(museum.id)];

        let grouped = attach_tickets(vec![zoo.clone(), museum.clone()], tickets);

        assert_eq!(grouped[0].attraction.id, zoo.id);
        assert_eq!(grouped[0].tickets.len(), 1);
        assert_eq!(grouped[1].attraction.id, museum.id);
        assert_eq!(grouped[1].tickets.len(), 2);
    }

    #[test]
    fn test_attraction_without_tickets_gets_empty_list() {
        let grouped = attach_tickets(vec![attraction("Aquarium")], Vec::new());
        assert!(grouped[0].tickets.is_empty());
    }
}
