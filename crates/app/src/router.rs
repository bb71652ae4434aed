use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;

use employee_facade_core::{
    CreateEmployeeRequest, Employee, EmployeeService, GatewayError,
};

use crate::error::ApiError;
use crate::telemetry;

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    employees: EmployeeService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, employees: EmployeeService) -> Self {
        Self { metrics, employees }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn employees(&self) -> &EmployeeService {
        &self.employees
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route(
            "/api/employee",
            get(get_all_employees).post(create_employee),
        )
        .route("/api/employee/search/:term", get(search_employees))
        .route("/api/employee/highestSalary", get(highest_salary))
        .route(
            "/api/employee/topTenHighestEarningEmployeeNames",
            get(top_ten_highest_earning_names),
        )
        .route(
            "/api/employee/:id",
            get(get_employee_by_id).delete(delete_employee_by_id),
        )
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
}

fn record<T>(operation: &'static str, result: Result<T, GatewayError>) -> Result<T, ApiError> {
    let label = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind().as_str(),
    };
    counter!("api_requests_total", "operation" => operation, "result" => label).increment(1);
    result.map_err(ApiError::from)
}

async fn get_all_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    record("list", state.employees().get_all_employees().await).map(Json)
}

async fn search_employees(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    record("search", state.employees().search_by_name(&term).await).map(Json)
}

async fn get_employee_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    record("get_by_id", state.employees().get_by_id(&id).await).map(Json)
}

async fn highest_salary(State(state): State<AppState>) -> Result<Json<Option<u32>>, ApiError> {
    record("highest_salary", state.employees().highest_salary().await).map(Json)
}

async fn top_ten_highest_earning_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    record(
        "top_ten",
        state.employees().top_ten_highest_earners().await,
    )
    .map(Json)
}

async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let result = match payload {
        Ok(Json(request)) => state.employees().create_employee(&request).await,
        Err(rejection) => Err(GatewayError::validation(rejection.body_text())),
    };
    let employee = record("create", result)?;

    let location = format!("/api/employee/{}", employee.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(employee),
    )
        .into_response())
}

async fn delete_employee_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    record("delete", state.employees().delete_by_id(&id).await)
}
