//! Repository for the `users` profile table, plus the profile operations that
//! also touch the identity provider.

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::{AuthGateway, Identity, UserAttributes};
use crate::backend::{BackendClient, BackendError};
use crate::models::user::{CurrentUser, UpdateProfile, UserProfile, DEFAULT_ROLE};
use crate::utils::error::{AppError, AppResult};

const COLUMNS: &str = "id, full_name, company_name, role, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Resolves the caller's identity from an access token.
    pub async fn get_current(auth: &AuthGateway, access_token: &str) -> AppResult<Identity> {
        auth.get_user(access_token).await.map_err(|e| match e {
            BackendError::Api { status, message } if (400..500).contains(&status) => {
                tracing::warn!(status, message = %message, "Access token rejected");
                AppError::AuthError("No user found".to_string())
            }
            other => AppError::Backend(other),
        })
    }

    pub async fn find(pool: &PgPool, user_id: Uuid) -> AppResult<UserProfile> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    /// Creates the profile on first sign-in; an existing row is left as is.
    pub async fn ensure_exists(
        pool: &PgPool,
        user_id: Uuid,
        default_name: &str,
    ) -> AppResult<UserProfile> {
        let inserted = sqlx::query(
            "INSERT INTO users (id, full_name, role) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(user_id)
        .bind(default_name)
        .bind(DEFAULT_ROLE)
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(%user_id, "Created partner profile");
        }

        Self::find(pool, user_id).await
    }

    pub async fn update_full_name(
        pool: &PgPool,
        user_id: Uuid,
        full_name: &str,
    ) -> AppResult<UserProfile> {
        let sql = format!(
            "UPDATE users SET full_name = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(full_name)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    pub async fn update_company_name(
        pool: &PgPool,
        user_id: Uuid,
        company_name: &str,
    ) -> AppResult<UserProfile> {
        let sql = format!(
            "UPDATE users SET company_name = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(company_name)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        tracing::info!(%user_id, "Company name updated");
        Ok(profile)
    }

    /// Updates e-mail and display name at the identity provider, then the
    /// profile row. The provider half stays applied if the row update fails.
    pub async fn update_profile(
        backend: &BackendClient,
        access_token: &str,
        user_id: Uuid,
        input: &UpdateProfile,
    ) -> AppResult<CurrentUser> {
        let identity = backend
            .auth
            .update_user(
                access_token,
                &UserAttributes {
                    email: Some(input.email.clone()),
                    data: Some(json!({ "name": input.name })),
                    ..Default::default()
                },
            )
            .await?;

        let profile = Self::update_full_name(&backend.pool, user_id, &input.name).await?;

        tracing::info!(%user_id, "Profile updated");
        Ok(CurrentUser { identity, profile })
    }

    /// Removes the partner's tickets, attractions and profile in one
    /// transaction, then ends the session. The provider identity is kept.
    pub async fn delete_profile(
        backend: &BackendClient,
        access_token: &str,
        user_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = backend.pool.begin().await?;

        let tickets = sqlx::query(
            "DELETE FROM tickets t
             USING attractions a
             WHERE t.attraction_id = a.id AND a.user_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let attractions = sqlx::query("DELETE FROM attractions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            %user_id,
            attractions = attractions.rows_affected(),
            tickets = tickets.rows_affected(),
            "Partner profile deleted"
        );

        backend.auth.sign_out(access_token).await?;
        Ok(())
    }
}
