//! REST API routes for the lending book.
//!
//! Thin translation layer: JSON in, service call, JSON out. All policy
//! lives in the engine; this module only maps transport types and turns
//! domain errors into status codes.

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use lendbook_common::{
    Amount, BookError, Bps, LendbookError, LoanRequest, MatchError, OfferError, RateError, VERSION,
};
use lendbook_engine::{FillPolicy, PoolService};

type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct PlaceOfferRequest {
    lender: String,
    amount: Amount,
    apy_bps: Bps,
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    amount: Amount,
}

#[derive(Debug, Deserialize)]
struct LoanBody {
    borrower: String,
    amount: Amount,
}

#[derive(Debug, Deserialize)]
struct LoanQuery {
    /// `?partial=true` opts this request into partial fills.
    partial: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OffersQuery {
    lender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WithdrawQuery {
    lender: String,
}

/// Build the gateway router around a shared pool service.
pub fn router(service: Arc<PoolService>) -> Router {
    // CORS layer to allow frontend connections from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        // Health & metadata
        .route("/health", get(health))
        .route("/api/v1/version", get(version))
        // Rates
        .route("/api/v1/rates/band", get(rate_band))
        // Offers
        .route(
            "/api/v1/pools/:pool/offers",
            get(list_offers).post(place_offer),
        )
        .route(
            "/api/v1/pools/:pool/offers/:offer_id",
            get(get_offer).delete(withdraw_offer),
        )
        // Matching
        .route("/api/v1/pools/:pool/quote", post(quote))
        .route("/api/v1/pools/:pool/loans", post(request_loan))
        .route("/api/v1/pools/:pool/stats", get(pool_stats))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": VERSION,
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "lendbook-gateway",
        "version": VERSION,
        "description": "Fixed-rate lending orderbook: matching engine and APY aggregation",
    }))
}

async fn rate_band(State(service): State<Arc<PoolService>>) -> ApiResult<Json<serde_json::Value>> {
    let report = service.rate_report().await.map_err(error_response)?;
    Ok(Json(serde_json::json!(report)))
}

async fn list_offers(
    State(service): State<Arc<PoolService>>,
    Path(pool): Path<String>,
    Query(query): Query<OffersQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let snapshot = service.pool_snapshot(&pool).await.map_err(error_response)?;

    let offers: Vec<_> = snapshot
        .offers
        .into_iter()
        .filter(|o| query.lender.as_ref().map_or(true, |l| &o.lender == l))
        .collect();

    Ok(Json(serde_json::json!({
        "pool": snapshot.pool,
        "version": snapshot.version,
        "total": offers.len(),
        "offers": offers,
    })))
}

async fn place_offer(
    State(service): State<Arc<PoolService>>,
    Path(pool): Path<String>,
    Json(req): Json<PlaceOfferRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let offer = service
        .place_offer(&pool, &req.lender, req.amount, req.apy_bps)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(serde_json::json!(offer))))
}

async fn get_offer(
    State(service): State<Arc<PoolService>>,
    Path((pool, offer_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    let offer = service
        .get_offer(&pool, &offer_id)
        .await
        .map_err(error_response)?;
    Ok(Json(serde_json::json!(offer)))
}

async fn withdraw_offer(
    State(service): State<Arc<PoolService>>,
    Path((pool, offer_id)): Path<(String, Uuid)>,
    Query(query): Query<WithdrawQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let freed = service
        .withdraw_offer(&pool, &offer_id, &query.lender)
        .await
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({
        "offer_id": offer_id,
        "freed": freed,
    })))
}

async fn quote(
    State(service): State<Arc<PoolService>>,
    Path(pool): Path<String>,
    Json(req): Json<QuoteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let result = service
        .quote(&pool, req.amount)
        .await
        .map_err(error_response)?;
    Ok(Json(serde_json::json!(result)))
}

async fn request_loan(
    State(service): State<Arc<PoolService>>,
    Path(pool): Path<String>,
    Query(query): Query<LoanQuery>,
    Json(body): Json<LoanBody>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let request = LoanRequest::new(body.borrower, body.amount);

    let receipt = match query.partial {
        Some(true) => {
            service
                .request_loan_with(&pool, &request, FillPolicy::AllowPartial)
                .await
        }
        Some(false) => {
            service
                .request_loan_with(&pool, &request, FillPolicy::RejectPartial)
                .await
        }
        None => service.request_loan(&pool, &request).await,
    }
    .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(serde_json::json!(receipt))))
}

async fn pool_stats(
    State(service): State<Arc<PoolService>>,
    Path(pool): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let stats = service.pool_stats(&pool).await.map_err(error_response)?;
    Ok(Json(serde_json::json!(stats)))
}

/// Map domain errors to HTTP status codes.
///
/// Validation failures are 422, liquidity and staleness problems are
/// 409, lookups that found nothing are 404, ownership violations are
/// 403. Everything else is a 500.
fn error_response(err: LendbookError) -> ApiError {
    let status = match &err {
        LendbookError::Match(MatchError::InvalidAmount)
        | LendbookError::Offer(OfferError::InvalidAmount)
        | LendbookError::Rate(RateError::OutOfRange { .. }) => StatusCode::UNPROCESSABLE_ENTITY,

        LendbookError::InsufficientLiquidity { .. }
        | LendbookError::Offer(OfferError::Inactive)
        | LendbookError::Offer(OfferError::ExceedsAvailable { .. })
        | LendbookError::Book(BookError::VersionConflict { .. }) => StatusCode::CONFLICT,

        LendbookError::Book(BookError::PoolNotFound(_))
        | LendbookError::Book(BookError::OfferNotFound(_)) => StatusCode::NOT_FOUND,

        LendbookError::Book(BookError::NotOfferOwner { .. }) => StatusCode::FORBIDDEN,

        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_422() {
        for err in [
            LendbookError::from(MatchError::InvalidAmount),
            LendbookError::from(OfferError::InvalidAmount),
            LendbookError::from(RateError::OutOfRange {
                apy_bps: 500,
                min_bps: 435,
                max_bps: 475,
            }),
        ] {
            let (status, _) = error_response(err);
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn test_liquidity_and_staleness_are_409() {
        for err in [
            LendbookError::InsufficientLiquidity {
                requested: 150,
                available: 100,
            },
            LendbookError::from(BookError::VersionConflict {
                expected: 1,
                found: 2,
            }),
            LendbookError::from(OfferError::Inactive),
        ] {
            let (status, _) = error_response(err);
            assert_eq!(status, StatusCode::CONFLICT);
        }
    }

    #[test]
    fn test_missing_resources_are_404() {
        let (status, _) = error_response(BookError::PoolNotFound("dai".into()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(BookError::OfferNotFound(Uuid::now_v7()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_ownership_violation_is_403() {
        let err = BookError::NotOfferOwner {
            offer_id: Uuid::now_v7(),
            caller: "0xmallory".into(),
        };
        let (status, _) = error_response(err.into());
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_are_500() {
        let (status, _) = error_response(LendbookError::Internal("boom".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_carries_message() {
        let (_, Json(body)) = error_response(LendbookError::InsufficientLiquidity {
            requested: 150,
            available: 100,
        });
        let msg = body["error"].as_str().unwrap();
        assert!(msg.contains("requested 150"));
        assert!(msg.contains("available 100"));
    }

    #[test]
    fn test_negative_amounts_fail_deserialization() {
        let err =
            serde_json::from_str::<PlaceOfferRequest>(r#"{"lender":"0xa","amount":-5,"apy_bps":400}"#);
        assert!(err.is_err());

        let err = serde_json::from_str::<LoanBody>(r#"{"borrower":"0xb","amount":-1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_loan_query_accepts_partial_flag() {
        let query: LoanQuery = serde_json::from_str(r#"{"partial":true}"#).unwrap();
        assert_eq!(query.partial, Some(true));

        let query: LoanQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.partial, None);
    }
}
