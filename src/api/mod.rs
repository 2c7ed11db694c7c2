use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::ServeConfig;
use crate::core::{
    CalcError, CdbProduct, DayCountConvention, Field, RateConvention, RetirementInputs,
    SimulationInput, ValidationError, YieldBreakdown, calculate_net_yield,
    decompose_yield_from_input, months_to_goal_from_input, plan_retirement, project_from_input,
    terms_from_input,
};
use crate::rates::{BenchmarkRate, RateProvider};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRateConvention {
    #[serde(alias = "compound")]
    Effective,
    #[serde(alias = "simple")]
    Nominal,
}

impl From<ApiRateConvention> for RateConvention {
    fn from(value: ApiRateConvention) -> Self {
        match value {
            ApiRateConvention::Effective => RateConvention::Effective,
            ApiRateConvention::Nominal => RateConvention::Nominal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDayCount {
    Calendar,
    #[serde(alias = "businessDay", alias = "business_day")]
    BusinessDay,
}

impl From<ApiDayCount> for DayCountConvention {
    fn from(value: ApiDayCount) -> Self {
        match value {
            ApiDayCount::Calendar => DayCountConvention::Calendar,
            ApiDayCount::BusinessDay => DayCountConvention::BusinessDay,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCdbProduct {
    #[default]
    Plain,
    #[serde(alias = "highBalance", alias = "high_balance")]
    HighBalance,
    #[serde(alias = "longTerm", alias = "long_term")]
    LongTerm,
}

/// A form value as sent by clients: either a JSON number or the raw text the
/// user typed, such as `"1.234,56"`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(value) => value.to_string(),
            NumberOrText::Text(text) => text,
        }
    }
}

fn form<const N: usize>(fields: [(Field, Option<NumberOrText>); N]) -> SimulationInput {
    let mut input = SimulationInput::new();
    for (field, value) in fields {
        if let Some(value) = value {
            input.set(field, value.into_text());
        }
    }
    input
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    initial_amount: Option<NumberOrText>,
    monthly_contribution: Option<NumberOrText>,
    annual_rate: Option<NumberOrText>,
    period_months: Option<NumberOrText>,
    convention: Option<ApiRateConvention>,
}

impl ProjectionPayload {
    fn into_input(self) -> (SimulationInput, RateConvention) {
        let convention = self.convention.map_or(RateConvention::Effective, Into::into);
        let input = form([
            (Field::InitialAmount, self.initial_amount),
            (Field::MonthlyContribution, self.monthly_contribution),
            (Field::AnnualRate, self.annual_rate),
            (Field::PeriodMonths, self.period_months),
        ]);
        (input, convention)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    initial_amount: Option<NumberOrText>,
    monthly_contribution: Option<NumberOrText>,
    annual_rate: Option<NumberOrText>,
    target_amount: Option<NumberOrText>,
    convention: Option<ApiRateConvention>,
}

impl GoalPayload {
    fn into_input(self) -> (SimulationInput, RateConvention) {
        let convention = self.convention.map_or(RateConvention::Effective, Into::into);
        let input = form([
            (Field::InitialAmount, self.initial_amount),
            (Field::MonthlyContribution, self.monthly_contribution),
            (Field::AnnualRate, self.annual_rate),
            (Field::TargetAmount, self.target_amount),
        ]);
        (input, convention)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CdbPayload {
    initial_amount: Option<NumberOrText>,
    benchmark_percentage: Option<NumberOrText>,
    period_months: Option<NumberOrText>,
    benchmark_rate: Option<NumberOrText>,
    product: Option<ApiCdbProduct>,
    /// Principal (high-balance) or months (long-term) the bonus kicks in above.
    bonus_threshold: Option<NumberOrText>,
    /// Percent per month added to the rate, `0.1` meaning 0.1% a month.
    monthly_bonus: Option<NumberOrText>,
    convention: Option<ApiRateConvention>,
}

struct CdbRequest {
    input: SimulationInput,
    product_kind: ApiCdbProduct,
    convention: RateConvention,
}

impl CdbPayload {
    fn into_request(self) -> CdbRequest {
        let input = form([
            (Field::InitialAmount, self.initial_amount),
            (Field::BenchmarkPercentage, self.benchmark_percentage),
            (Field::PeriodMonths, self.period_months),
            (Field::BenchmarkRate, self.benchmark_rate),
            (Field::BonusThreshold, self.bonus_threshold),
            (Field::MonthlyBonus, self.monthly_bonus),
        ]);
        CdbRequest {
            input,
            product_kind: self.product.unwrap_or_default(),
            convention: self.convention.map_or(RateConvention::Nominal, Into::into),
        }
    }
}

impl CdbRequest {
    fn product(&self) -> Result<CdbProduct, ValidationError> {
        let product = match self.product_kind {
            ApiCdbProduct::Plain => CdbProduct::plain(),
            ApiCdbProduct::HighBalance => CdbProduct::high_balance(
                self.input.required(Field::BonusThreshold)?,
                self.input.required(Field::MonthlyBonus)? / 100.0,
            ),
            ApiCdbProduct::LongTerm => CdbProduct::long_term(
                self.input.required_count(Field::BonusThreshold)?,
                self.input.required(Field::MonthlyBonus)? / 100.0,
            ),
        };
        Ok(product.with_convention(self.convention))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct YieldPayload {
    initial_amount: Option<NumberOrText>,
    annual_rate: Option<NumberOrText>,
    convention: Option<ApiDayCount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    desired_monthly_income: Option<NumberOrText>,
    current_age: Option<NumberOrText>,
    retirement_age: Option<NumberOrText>,
    initial_amount: Option<NumberOrText>,
    annual_rate: Option<NumberOrText>,
    retirement_years: Option<NumberOrText>,
}

impl RetirementPayload {
    fn into_input(self) -> SimulationInput {
        form([
            (Field::DesiredMonthlyIncome, self.desired_monthly_income),
            (Field::CurrentAge, self.current_age),
            (Field::RetirementAge, self.retirement_age),
            (Field::InitialAmount, self.initial_amount),
            (Field::AnnualRate, self.annual_rate),
            (Field::RetirementYears, self.retirement_years),
        ])
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum BenchmarkSource {
    Request,
    Snapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdbResponse<T: Serialize> {
    /// Annual benchmark rate in percent that the calculation used.
    benchmark_rate: f64,
    benchmark_source: BenchmarkSource,
    #[serde(flatten)]
    result: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YieldResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    calendar: Option<YieldBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_day: Option<YieldBreakdown>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Process-wide state: the benchmark rate fetched once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub rate: BenchmarkRate,
}

impl AppState {
    pub fn new(rate: BenchmarkRate) -> Self {
        Self { rate }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/rate", get(rate_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/goal", get(goal_get_handler).post(goal_post_handler))
        .route("/api/cdb", get(cdb_get_handler).post(cdb_post_handler))
        .route("/api/yield", get(yield_get_handler).post(yield_post_handler))
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: ServeConfig) -> Result<(), Box<dyn Error>> {
    let provider = config.rate_source.provider()?;
    let rate = provider.fetch_benchmark_rate().await;
    match &rate {
        BenchmarkRate::Available { percent, .. } => {
            info!(percent, "benchmark rate ready")
        }
        BenchmarkRate::Unavailable { reason } => {
            info!(%reason, "serving without a benchmark rate; CDB requests need benchmarkRate")
        }
    }

    let app = router(Arc::new(AppState::new(rate)));
    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "finsim HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn rate_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, &state.rate)
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let (input, convention) = payload.into_input();
    debug!(?input, ?convention, "projection request");
    respond(project_from_input(&input, convention).map_err(CalcError::from))
}

async fn goal_get_handler(Query(payload): Query<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

async fn goal_post_handler(Json(payload): Json<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

fn goal_handler_impl(payload: GoalPayload) -> Response {
    let (input, convention) = payload.into_input();
    debug!(?input, ?convention, "goal request");
    respond(months_to_goal_from_input(&input, convention).map_err(CalcError::from))
}

async fn cdb_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<CdbPayload>,
) -> Response {
    cdb_handler_impl(&state, payload)
}

async fn cdb_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CdbPayload>,
) -> Response {
    cdb_handler_impl(&state, payload)
}

fn cdb_handler_impl(state: &AppState, payload: CdbPayload) -> Response {
    let request = payload.into_request();
    debug!(input = ?request.input, product = ?request.product_kind, "cdb request");
    respond(run_cdb(state, &request))
}

fn run_cdb(state: &AppState, request: &CdbRequest) -> Result<impl Serialize, CalcError> {
    let override_percent = request.input.optional(Field::BenchmarkRate)?;
    let benchmark_rate = state.rate.resolve(override_percent)?;
    let benchmark_source = if override_percent.is_some() {
        BenchmarkSource::Request
    } else {
        BenchmarkSource::Snapshot
    };
    let terms = terms_from_input(&request.input, benchmark_rate)?;
    let product = request.product()?;
    let result = calculate_net_yield(&terms, &product)?;
    Ok(CdbResponse {
        benchmark_rate,
        benchmark_source,
        result,
    })
}

async fn yield_get_handler(Query(payload): Query<YieldPayload>) -> Response {
    yield_handler_impl(payload)
}

async fn yield_post_handler(Json(payload): Json<YieldPayload>) -> Response {
    yield_handler_impl(payload)
}

fn yield_handler_impl(payload: YieldPayload) -> Response {
    let convention = payload.convention.map(DayCountConvention::from);
    let input = form([
        (Field::InitialAmount, payload.initial_amount),
        (Field::AnnualRate, payload.annual_rate),
    ]);
    debug!(?input, ?convention, "yield request");
    respond(run_yield(&input, convention))
}

fn run_yield(
    input: &SimulationInput,
    convention: Option<DayCountConvention>,
) -> Result<YieldResponse, CalcError> {
    let wanted = |candidate: DayCountConvention| convention.is_none_or(|c| c == candidate);
    let calendar = wanted(DayCountConvention::Calendar)
        .then(|| decompose_yield_from_input(input, DayCountConvention::Calendar))
        .transpose()?;
    let business_day = wanted(DayCountConvention::BusinessDay)
        .then(|| decompose_yield_from_input(input, DayCountConvention::BusinessDay))
        .transpose()?;
    Ok(YieldResponse {
        calendar,
        business_day,
    })
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    retirement_handler_impl(payload)
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    retirement_handler_impl(payload)
}

fn retirement_handler_impl(payload: RetirementPayload) -> Response {
    let input = payload.into_input();
    debug!(?input, "retirement request");
    let plan = RetirementInputs::from_input(&input).and_then(|inputs| plan_retirement(&inputs));
    respond(plan.map_err(CalcError::from))
}

fn respond<T: Serialize>(result: Result<T, CalcError>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            let status = match err {
                CalcError::Validation(_) => StatusCode::BAD_REQUEST,
                CalcError::RateUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            debug!(%status, error = %err, "calculation rejected");
            error_response(status, &err.to_string())
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
