//! Generation credits: a per-user balance on `users`, and a per-IP balance on
//! `ip_credits` for visitors without an account. IP rows are created on first
//! sight with a configured starting balance.

pub mod handlers;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditSource {
    User,
    Ip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpCreditStatus {
    pub available: bool,
    pub remaining: i32,
    pub ip: String,
}

impl IpCreditStatus {
    fn from_stored(ip: &str, credits: Option<i32>) -> Self {
        let remaining = credits.unwrap_or(0);
        Self {
            available: remaining > 0,
            remaining,
            ip: ip.to_string(),
        }
    }
}

#[derive(Debug, FromRow)]
struct IpCreditRow {
    credits: Option<i32>,
}

/// Returns the balance for `ip`, seeding it with `initial_credits` when the
/// address has never been seen. A concurrent seed never resets a balance.
pub async fn get_ip_credit_status(
    pool: &PgPool,
    ip: &str,
    initial_credits: i32,
) -> Result<IpCreditStatus, sqlx::Error> {
    if let Some(row) = fetch_ip_row(pool, ip).await? {
        return Ok(IpCreditStatus::from_stored(ip, row.credits));
    }

    let seeded = sqlx::query(
        "INSERT INTO ip_credits (ip, credits) VALUES ($1, $2) ON CONFLICT (ip) DO NOTHING",
    )
    .bind(ip)
    .bind(initial_credits)
    .execute(pool)
    .await?;

    if seeded.rows_affected() > 0 {
        info!("Seeded {initial_credits} credits for new ip {ip}");
    }

    let credits = fetch_ip_row(pool, ip).await?.and_then(|row| row.credits);
    Ok(IpCreditStatus::from_stored(ip, credits))
}

async fn fetch_ip_row(pool: &PgPool, ip: &str) -> Result<Option<IpCreditRow>, sqlx::Error> {
    sqlx::query_as("SELECT credits FROM ip_credits WHERE ip = $1")
        .bind(ip)
        .fetch_optional(pool)
        .await
}

/// Spends one credit for `ip` and returns the new balance, or `None` when
/// the balance is already empty (or the row is missing). The decrement
/// happens in the database, so concurrent spends never share a credit.
pub async fn consume_ip_credit(pool: &PgPool, ip: &str) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<IpCreditRow> = sqlx::query_as(
        r#"
        UPDATE ip_credits
        SET credits = GREATEST(credits - 1, 0)
        WHERE ip = $1 AND credits > 0
        RETURNING credits
        "#,
    )
    .bind(ip)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| row.credits.unwrap_or(0)))
}

/// Seeds `ip` on first sight, then spends one credit from it.
/// `Ok(None)` when there was nothing left to spend.
pub async fn spend_ip_credit(
    pool: &PgPool,
    ip: &str,
    initial_credits: i32,
) -> Result<Option<i32>, sqlx::Error> {
    let status = get_ip_credit_status(pool, ip, initial_credits).await?;
    if !status.available {
        return Ok(None);
    }
    consume_ip_credit(pool, ip).await
}

/// Account balance; a missing user or null column reads as 0.
pub async fn get_user_credits(pool: &PgPool, user_id: Uuid) -> Result<i32, sqlx::Error> {
    let credits: Option<Option<i32>> =
        sqlx::query_scalar("SELECT credits FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(credits.flatten().unwrap_or(0))
}
