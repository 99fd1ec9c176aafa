//! Repository for the `tickets` table.
//!
//! Every mutating statement joins back to `attractions` and filters on the
//! owner, so the ownership check and the write are the same statement.

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::models::ticket::{NewTicket, Ticket, UpdateTicket};
use crate::utils::error::{AppError, AppResult};

const COLUMNS: &str = "id, attraction_id, name, description, price, currency, \
     validity_start, validity_end, created_at, updated_at";

/// `COLUMNS` qualified with the `t` alias for statements that join `attractions`.
const T_COLUMNS: &str = "t.id, t.attraction_id, t.name, t.description, t.price, t.currency, \
     t.validity_start, t.validity_end, t.created_at, t.updated_at";

const VALIDITY_CONSTRAINT: &str = "tickets_validity_window";

pub struct TicketRepo;

impl TicketRepo {
    /// Inserts one ticket for `attraction_id`. Ownership must already be
    /// established by the caller (used inside the attraction creation transaction).
    pub(crate) async fn insert<'e, E>(
        executor: E,
        attraction_id: Uuid,
        ticket: &NewTicket,
        price: Decimal,
    ) -> Result<Ticket, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO tickets
                (attraction_id, name, description, price, currency, validity_start, validity_end)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(attraction_id)
            .bind(&ticket.name)
            .bind(&ticket.description)
            .bind(price)
            .bind(ticket.currency_code())
            .bind(ticket.validity_start)
            .bind(ticket.validity_end)
            .fetch_one(executor)
            .await
    }

    /// Adds a ticket to an attraction owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        attraction_id: Uuid,
        user_id: Uuid,
        ticket: &NewTicket,
    ) -> AppResult<Ticket> {
        let price = ticket.price_decimal()?;

        let query = format!(
            "INSERT INTO tickets
                (attraction_id, name, description, price, currency, validity_start, validity_end)
             SELECT a.id, $3, $4, $5, $6, $7, $8
             FROM attractions a
             WHERE a.id = $1 AND a.user_id = $2
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Ticket>(&query)
            .bind(attraction_id)
            .bind(user_id)
            .bind(&ticket.name)
            .bind(&ticket.description)
            .bind(price)
            .bind(ticket.currency_code())
            .bind(ticket.validity_start)
            .bind(ticket.validity_end)
            .fetch_optional(pool)
            .await
            .map_err(map_constraint)?;

        match created {
            Some(ticket) => {
                tracing::info!(ticket_id = %ticket.id, %attraction_id, "Ticket created");
                Ok(ticket)
            }
            None => {
                tracing::warn!(%attraction_id, %user_id, "Ticket create on unowned attraction");
                Err(AppError::not_found_or_denied("Attraction"))
            }
        }
    }

    /// Applies the non-`None` fields of `input` to a ticket whose attraction
    /// belongs to `user_id`.
    pub async fn update(
        pool: &PgPool,
        ticket_id: Uuid,
        user_id: Uuid,
        input: &UpdateTicket,
    ) -> AppResult<Ticket> {
        let query = format!(
            "UPDATE tickets t SET
                name = COALESCE($3, t.name),
                description = COALESCE($4, t.description),
                price = COALESCE($5, t.price),
                currency = COALESCE($6, t.currency),
                validity_start = COALESCE($7, t.validity_start),
                validity_end = COALESCE($8, t.validity_end),
                updated_at = NOW()
             FROM attractions a
             WHERE t.id = $1 AND a.id = t.attraction_id AND a.user_id = $2
             RETURNING {T_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.currency_code())
            .bind(input.validity_start)
            .bind(input.validity_end)
            .fetch_optional(pool)
            .await
            .map_err(map_constraint)?;

        updated.ok_or_else(|| {
            tracing::warn!(%ticket_id, %user_id, "Ticket update denied");
            AppError::not_found_or_denied("Ticket")
        })
    }

    pub async fn delete(pool: &PgPool, ticket_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM tickets t
             USING attractions a
             WHERE t.id = $1 AND a.id = t.attraction_id AND a.user_id = $2",
        )
        .bind(ticket_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(%ticket_id, %user_id, "Ticket delete denied");
            return Err(AppError::not_found_or_denied("Ticket"));
        }

        tracing::info!(%ticket_id, "Ticket deleted");
        Ok(())
    }

    /// Number of tickets across the given attractions. An empty set is answered
    /// without touching the database.
    pub async fn count(pool: &PgPool, attraction_ids: &[Uuid]) -> AppResult<i64> {
        if attraction_ids.is_empty() {
            return Ok(0);
        }

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE attraction_id = ANY($1)")
                .bind(attraction_ids)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Tickets of the given attractions, oldest validity window first.
    pub async fn list_for(pool: &PgPool, attraction_ids: &[Uuid]) -> AppResult<Vec<Ticket>> {
        if attraction_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE attraction_id = ANY($1)
             ORDER BY validity_start ASC, created_at ASC"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .bind(attraction_ids)
            .fetch_all(pool)
            .await?;
        Ok(tickets)
    }
}

/// A stored window can still be inverted by a one-sided update; report that
/// as a validation failure rather than a database fault.
fn map_constraint(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &error {
        if db.constraint() == Some(VALIDITY_CONSTRAINT) {
            return AppError::validation("Validity end must not be before validity start");
        }
    }
    AppError::from(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    /// A pool that never connects: any query through it fails fast.
    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap()
    }

    #[tokio::test]
    async fn test_count_of_no_attractions_skips_the_database() {
        let pool = unreachable_pool();
        assert_eq!(TicketRepo::count(&pool, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_with_ids_does_query() {
        let pool = unreachable_pool();
        let result = TicketRepo::count(&pool, &[Uuid::new_v4()]).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_list_for_no_attractions_is_empty() {
        let pool = unreachable_pool();
        assert!(TicketRepo::list_for(&pool, &[]).await.unwrap().is_empty());
    }
}
