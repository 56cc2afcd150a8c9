use axum::{
    Router, async_trait,
    extract::{FromRequest, Json, Query, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Serialize, de::DeserializeOwned};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    CalcResult, InflationSeries, adjust_for_inflation, calculate_car_finance, calculate_mortgage,
    calculate_take_home, project_compound, project_growth, solve_contribution_for_target,
    solve_overpayment_for_term,
};

mod payload;

use payload::{
    CarFinancePayload, CompoundPayload, ContributionGoal, InflationPayload, MortgagePayload,
    OverpaymentGoal, PensionPayload, SolveContributionPayload, SolveOverpaymentPayload,
    TakeHomePayload,
};

#[derive(Clone)]
pub struct AppState {
    pub inflation: Arc<InflationSeries>,
}

impl AppState {
    pub fn new(inflation: InflationSeries) -> Self {
        Self {
            inflation: Arc::new(inflation),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(InflationSeries::uk_cpi())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    inflation_first_year: i32,
    inflation_last_year: i32,
}

/// Query string on GET, JSON body on anything else. Both go through the same
/// optional-key payload struct, so omitted keys fall back to calculator defaults.
struct Payload<T>(T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() == Method::GET {
            let Query(value) = Query::<T>::try_from_uri(req.uri())
                .map_err(|e| error_response(e.status(), &e.body_text()))?;
            return Ok(Payload(value));
        }
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(e.status(), &e.body_text()))?;
        Ok(Payload(value))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/mortgage", get(mortgage_handler).post(mortgage_handler))
        .route(
            "/api/car-finance",
            get(car_finance_handler).post(car_finance_handler),
        )
        .route("/api/pension", get(pension_handler).post(pension_handler))
        .route("/api/compound", get(compound_handler).post(compound_handler))
        .route(
            "/api/inflation",
            get(inflation_handler).post(inflation_handler),
        )
        .route(
            "/api/take-home",
            get(take_home_handler).post(take_home_handler),
        )
        .route(
            "/api/solve/overpayment",
            get(solve_overpayment_handler).post(solve_overpayment_handler),
        )
        .route(
            "/api/solve/contribution",
            get(solve_contribution_handler).post(solve_contribution_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "fincalc HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let years = state.inflation.supported_years();
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            inflation_first_year: *years.start(),
            inflation_last_year: *years.end(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn mortgage_handler(Payload(payload): Payload<MortgagePayload>) -> Response {
    calculation_response(calculate_mortgage(&payload.into()))
}

async fn car_finance_handler(Payload(payload): Payload<CarFinancePayload>) -> Response {
    calculation_response(calculate_car_finance(&payload.into()))
}

async fn pension_handler(Payload(payload): Payload<PensionPayload>) -> Response {
    calculation_response(project_growth(&payload.into()))
}

async fn compound_handler(Payload(payload): Payload<CompoundPayload>) -> Response {
    calculation_response(project_compound(&payload.into()))
}

async fn inflation_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<InflationPayload>,
) -> Response {
    calculation_response(adjust_for_inflation(&state.inflation, &payload.into()))
}

async fn take_home_handler(Payload(payload): Payload<TakeHomePayload>) -> Response {
    calculation_response(calculate_take_home(&payload.into()))
}

async fn solve_overpayment_handler(Payload(payload): Payload<SolveOverpaymentPayload>) -> Response {
    let goal = match OverpaymentGoal::try_from(payload) {
        Ok(goal) => goal,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    calculation_response(solve_overpayment_for_term(
        &goal.mortgage,
        goal.target_months,
        goal.config,
    ))
}

async fn solve_contribution_handler(
    Payload(payload): Payload<SolveContributionPayload>,
) -> Response {
    let goal = match ContributionGoal::try_from(payload) {
        Ok(goal) => goal,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    calculation_response(solve_contribution_for_target(
        &goal.projection,
        goal.target_pot,
        goal.config,
    ))
}

fn calculation_response<T: Serialize>(result: CalcResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            tracing::debug!(error = %err, "rejected calculator input");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use serde_json::Value;
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    async fn send(request: axum::http::Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = router(AppState::default())
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, cache_control, body)
    }

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_request(uri: &str, json: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_inflation_range() {
        let (status, _, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["inflationLastYear"], 2024);
    }

    #[tokio::test]
    async fn mortgage_get_uses_query_and_defaults() {
        let (status, cache_control, body) = send(get_request(
            "/api/mortgage?propertyPrice=250000&deposit=25000&annualRate=4.5&termYears=25",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        let payment = body["monthlyPayment"].as_f64().expect("payment");
        assert!((payment - 1_250.62).abs() < 0.01, "got {payment}");
        assert_eq!(body["termMonths"], 300);
    }

    #[tokio::test]
    async fn pension_post_rejects_allocations_not_summing_to_one_hundred() {
        let (status, _, body) = send(post_request(
            "/api/pension",
            r#"{"equitiesPct": 70, "bondsPct": 20, "cashPct": 5}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains("allocations"), "got {error}");
    }

    #[tokio::test]
    async fn inflation_uses_shared_series() {
        let (status, _, body) = send(get_request(
            "/api/inflation?amount=100&startYear=2021&endYear=2023",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        // 2021 at 2.6%, 2022 at 9.1%
        assert_approx(
            body["adjustedAmount"].as_f64().expect("amount"),
            100.0 * 1.026 * 1.091,
        );
    }

    #[tokio::test]
    async fn inflation_rejects_years_outside_table() {
        let (status, _, body) = send(get_request("/api/inflation?startYear=1900")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn take_home_post_returns_breakdown() {
        let (status, _, body) = send(post_request(
            "/api/take-home",
            r#"{"grossSalary": 30000}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_approx(body["annual"]["net"].as_f64().expect("net"), 25_119.6);
    }

    #[tokio::test]
    async fn car_finance_get_applies_balloon() {
        let (status, _, body) = send(get_request(
            "/api/car-finance?vehiclePrice=12000&deposit=0&annualRate=0&termMonths=24&balloon=2400",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_approx(body["monthlyPayment"].as_f64().expect("payment"), 400.0);
        assert_approx(body["totalInterest"].as_f64().expect("interest"), 0.0);
        assert_eq!(body["schedule"].as_array().map(Vec::len), Some(24));
    }

    #[tokio::test]
    async fn compound_post_returns_yearly_breakdown() {
        let (status, _, body) = send(post_request(
            "/api/compound",
            r#"{"initialAmount": 1000, "monthlyContribution": 0, "annualRate": 10, "years": 3, "compounding": "annually"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_approx(body["finalBalance"].as_f64().expect("balance"), 1_331.0);
        assert_eq!(body["years"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn compound_rejects_years_above_cap() {
        let (status, _, body) = send(get_request("/api/compound?years=4000000000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid years: must be <= 200");
    }

    #[tokio::test]
    async fn solve_contribution_finds_required_amount() {
        // 1000 + 120 months at 200 reaches 25000 with no growth.
        let (status, _, body) = send(post_request(
            "/api/solve/contribution",
            r#"{
              "startingBalance": 1000,
              "employerContribution": 0,
              "allocations": [{"name": "cash", "allocationPct": 100, "annualReturnPct": 0}],
              "inflationRate": 0,
              "startAge": 30,
              "endAge": 40,
              "targetPot": 25000,
              "searchMax": 1000
            }"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feasible"], true);
        let solved = body["solvedValue"].as_f64().expect("solved value");
        assert!((solved - 200.0).abs() <= 0.02, "got {solved}");
    }

    #[tokio::test]
    async fn mortgage_rejects_term_that_would_overflow() {
        let (status, _, body) = send(get_request("/api/mortgage?termYears=400000000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid term: must be <= 100 years");
    }

    #[tokio::test]
    async fn solve_overpayment_requires_target() {
        let (status, _, body) = send(get_request("/api/solve/overpayment")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "targetMonths is required");
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_error() {
        let (status, _, body) = send(get_request("/api/compound?years=ten")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_json() {
        let (status, cache_control, body) = send(get_request("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        assert_eq!(body["error"], "Not found");
    }
}
