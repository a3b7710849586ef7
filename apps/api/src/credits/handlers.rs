use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::credits::{get_ip_credit_status, get_user_credits, spend_ip_credit, CreditSource};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreditQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CreditResponse {
    pub available: bool,
    pub remaining: i32,
    pub source: CreditSource,
    pub ip: Option<String>,
}

impl CreditResponse {
    fn exhausted(source: CreditSource, ip: Option<String>) -> Self {
        Self {
            available: false,
            remaining: 0,
            source,
            ip,
        }
    }
}

type CreditReply = (StatusCode, Json<CreditResponse>);

fn peer_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    connect_info.map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// GET /api/v1/credits
pub async fn handle_get_credits(
    State(state): State<AppState>,
    Query(params): Query<CreditQuery>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> CreditReply {
    let ip = peer_ip(connect_info);

    if let Some(user_id) = params.user_id {
        return match get_user_credits(&state.db, user_id).await {
            Ok(remaining) => (
                StatusCode::OK,
                Json(CreditResponse {
                    available: remaining > 0,
                    remaining,
                    source: CreditSource::User,
                    ip,
                }),
            ),
            Err(e) => {
                error!("Failed to fetch user credits for {user_id}: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(CreditResponse::exhausted(CreditSource::User, None)),
                )
            }
        };
    }

    let Some(ip) = ip else {
        return (
            StatusCode::OK,
            Json(CreditResponse::exhausted(CreditSource::Ip, None)),
        );
    };

    match get_ip_credit_status(&state.db, &ip, state.config.ip_initial_credits).await {
        Ok(status) => (
            StatusCode::OK,
            Json(CreditResponse {
                available: status.available,
                remaining: status.remaining,
                source: CreditSource::Ip,
                ip: Some(status.ip),
            }),
        ),
        Err(e) => {
            error!("Failed to fetch IP credit for {ip}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CreditResponse::exhausted(CreditSource::Ip, Some(ip))),
            )
        }
    }
}

/// POST /api/v1/credits/consume
///
/// `available` in the reply says whether a credit was actually spent.
pub async fn handle_consume_credit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> CreditReply {
    let Some(ip) = peer_ip(connect_info) else {
        return (
            StatusCode::OK,
            Json(CreditResponse::exhausted(CreditSource::Ip, None)),
        );
    };

    match spend_ip_credit(&state.db, &ip, state.config.ip_initial_credits).await {
        Ok(Some(remaining)) => (
            StatusCode::OK,
            Json(CreditResponse {
                available: true,
                remaining,
                source: CreditSource::Ip,
                ip: Some(ip),
            }),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(CreditResponse::exhausted(CreditSource::Ip, Some(ip))),
        ),
        Err(e) => {
            error!("Failed to consume IP credit for {ip}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CreditResponse::exhausted(CreditSource::Ip, Some(ip))),
            )
        }
    }
}
