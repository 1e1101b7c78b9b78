//! An in-process listings backend speaking the same wire format as the real
//! one, with hooks for injecting failures and latency.

use std::collections::{HashSet, VecDeque};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{HttpServiceFactory, Server};
use actix_web::http::StatusCode;
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, ResponseError, get,
    http::header, post, web,
};
use parking_lot::Mutex;
use payloads::requests::{
    CreateProperty, LoginCredentials, PropertyFilters, SearchProperties,
};
use payloads::{
    ApiResponse, ErrorBody, Paginated, Property, PropertyId, Session,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::mock::{MockUser, sample_properties, sample_users};

const DEFAULT_LIMIT: u32 = 12;
const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// What the next request should fail with instead of being handled.
#[derive(Debug, Clone)]
struct Fault {
    status: u16,
    message: String,
}

struct Inner {
    properties: Vec<Property>,
    users: Vec<MockUser>,
    tokens: HashSet<String>,
    faults: VecDeque<Fault>,
    delay: Option<Duration>,
    requests: usize,
}

/// Backend state shared between the server and the test driving it.
pub struct Store {
    inner: Mutex<Inner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_properties(sample_properties())
    }
}

impl Store {
    pub fn with_properties(properties: Vec<Property>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                properties,
                users: sample_users(),
                tokens: HashSet::new(),
                faults: VecDeque::new(),
                delay: None,
                requests: 0,
            }),
        }
    }

    /// Make the next request answer with `status` and an error body
    /// carrying `message`. Queued faults are used in order.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.inner.lock().faults.push_back(Fault {
            status,
            message: message.into(),
        });
    }

    /// Hold every response back by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.inner.lock().delay = delay;
    }

    /// Invalidate every issued token, as if they had all expired.
    pub fn expire_tokens(&self) {
        self.inner.lock().tokens.clear();
    }

    pub fn properties(&self) -> Vec<Property> {
        self.inner.lock().properties.clone()
    }

    /// How many API requests have reached the backend.
    pub fn request_count(&self) -> usize {
        self.inner.lock().requests
    }

    async fn intercept(&self) -> Result<(), BackendError> {
        let (delay, fault) = {
            let mut inner = self.inner.lock();
            inner.requests += 1;
            (inner.delay, inner.faults.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match fault {
            Some(Fault { status, message }) => {
                Err(BackendError::Injected { status, message })
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum BackendError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Validation failed")]
    Validation(serde_json::Value),
    #[error("{message}")]
    Injected { status: u16, message: String },
}

impl ResponseError for BackendError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Injected { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let details = match self {
            Self::Validation(details) => Some(details.clone()),
            _ => None,
        };
        HttpResponse::build(status).json(ErrorBody {
            message: self.to_string(),
            status_code: status.as_u16(),
            details,
        })
    }
}

pub fn api_services() -> impl HttpServiceFactory {
    // search must be registered ahead of the {id} route
    web::scope("/api")
        .service(health_check)
        .service(login)
        .service(search_properties)
        .service(list_properties)
        .service(get_property)
        .service(create_property)
}

/// Bind the backend and return it unstarted, along with the bound port.
/// Port 0 gets an OS-assigned port.
pub fn build(
    ip: &str,
    port: u16,
    store: Arc<Store>,
) -> std::io::Result<(Server, u16)> {
    let store = web::Data::from(store);
    let listener = TcpListener::bind(format!("{ip}:{port}"))?;
    let port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        App::new()
            .service(api_services())
            .app_data(store.clone())
    })
    .workers(2)
    .listen(listener)?
    .run();
    Ok((server, port))
}

#[get("/health_check")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("healthy")
}

#[tracing::instrument(skip_all)]
#[post("/login")]
async fn login(
    credentials: web::Json<LoginCredentials>,
    store: web::Data<Store>,
) -> Result<HttpResponse, BackendError> {
    store.intercept().await?;
    let mut inner = store.inner.lock();
    let user = inner
        .users
        .iter()
        .find(|user| {
            user.profile.email.eq_ignore_ascii_case(&credentials.email)
                && user.password == credentials.password
        })
        .map(|user| user.profile.clone())
        .ok_or_else(|| {
            BackendError::BadRequest("Invalid email or password".into())
        })?;
    let token = Uuid::new_v4().to_string();
    inner.tokens.insert(token.clone());
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Session { token, user })))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    limit: Option<u32>,
}

#[tracing::instrument(skip(store), ret)]
#[get("/properties")]
async fn list_properties(
    params: web::Query<PageParams>,
    filters: web::Query<PropertyFilters>,
    store: web::Data<Store>,
) -> Result<HttpResponse, BackendError> {
    store.intercept().await?;
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 || limit == 0 {
        return Err(BackendError::BadRequest(
            "page and limit must be at least 1".into(),
        ));
    }
    let matching: Vec<Property> = store
        .properties()
        .into_iter()
        .filter(|property| matches_filters(property, &filters))
        .collect();
    let body = Paginated::from_slice(&matching, page, limit);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

fn matches_filters(property: &Property, filters: &PropertyFilters) -> bool {
    filters
        .city
        .as_ref()
        .is_none_or(|city| property.city.eq_ignore_ascii_case(city))
        && filters
            .max_rent
            .is_none_or(|max_rent| property.monthly_rent <= max_rent)
        && filters
            .min_bedrooms
            .is_none_or(|min| property.bedrooms >= min)
        && filters
            .property_type
            .is_none_or(|kind| property.property_type == kind)
        && filters
            .furnished
            .is_none_or(|furnished| property.furnished == furnished)
}

#[tracing::instrument(skip(store), ret)]
#[get("/properties/search")]
async fn search_properties(
    search: web::Query<SearchProperties>,
    store: web::Data<Store>,
) -> Result<HttpResponse, BackendError> {
    store.intercept().await?;
    let limit = search.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
    let found: Vec<Property> = store
        .properties()
        .into_iter()
        .filter(|property| property.matches_text(&search.q))
        .take(limit)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(found)))
}

#[tracing::instrument(skip(store), ret)]
#[get("/properties/{id}")]
async fn get_property(
    path: web::Path<Uuid>,
    store: web::Data<Store>,
) -> Result<HttpResponse, BackendError> {
    store.intercept().await?;
    let id = PropertyId(path.into_inner());
    let property = store
        .properties()
        .into_iter()
        .find(|property| property.id == id)
        .ok_or_else(|| BackendError::NotFound("Property not found".into()))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(property)))
}

#[tracing::instrument(skip_all)]
#[post("/properties")]
async fn create_property(
    request: HttpRequest,
    details: web::Json<CreateProperty>,
    store: web::Data<Store>,
) -> Result<HttpResponse, BackendError> {
    store.intercept().await?;
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let mut inner = store.inner.lock();
    if !token.is_some_and(|token| inner.tokens.contains(&token)) {
        return Err(BackendError::Unauthorized(
            "Invalid or expired token".into(),
        ));
    }

    let problems = details.validate();
    if !problems.is_empty() {
        let details = problems
            .iter()
            .map(|problem| {
                serde_json::json!({
                    "field": problem.field,
                    "message": problem.message,
                })
            })
            .collect();
        return Err(BackendError::Validation(serde_json::Value::Array(
            details,
        )));
    }

    let details = details.into_inner();
    let property = Property {
        id: PropertyId(Uuid::new_v4()),
        title: details.title,
        description: details.description,
        city: details.city,
        address: details.address,
        monthly_rent: details.monthly_rent,
        bedrooms: details.bedrooms,
        bathrooms: details.bathrooms,
        property_type: details.property_type,
        furnished: details.furnished,
        available_from: details.available_from,
        created_at: jiff::Timestamp::now(),
    };
    inner.properties.push(property.clone());
    Ok(HttpResponse::Created().json(ApiResponse::ok(property)))
}
