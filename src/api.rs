//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the catalog query engine, the recommendation and
//! suggestion operations, and the chat assistant to the storefront frontend.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with query-string filters, path ids, JSON bodies
//! - **Output**: JSON responses mirroring the storefront wire format
//!   (camelCase fields, `{products, pagination}` envelopes)
//! - **Errors**: 404 `{"error": "<Entity> not found"}` for missing ids,
//!   400 for an invalid page size, 500 `{"error": message}` otherwise
//!
//! ## Key Features
//! - Query-spec defaulting and validation at the boundary, not in the engine
//! - CORS support for the web frontend
//! - Per-request debug timing
//! - Route registration order keeps `/featured/list` ahead of `/{id}`

use crate::catalog::CATEGORY_LISTING;
use crate::chat;
use crate::engine::{CategoryFilter, QuerySpec, SortKey};
use crate::errors::{CatalogError, Result};
use crate::internal_error;
use crate::utils::{normalize_query, Timer};
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};

/// REST API server wrapping the shared application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Query-string parameters accepted by the product listing endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub in_stock: Option<bool>,
    pub sort_by: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Free-text query parameter for the AI endpoints
#[derive(Debug, Deserialize)]
pub struct QueryParam {
    pub q: Option<String>,
}

/// Body of the recommendations endpoint; `user_id` and `preferences` are
/// accepted but unused by the engine
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub preferences: Option<Vec<String>>,
}

/// Body of the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Body of the add-review placeholder endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub rating: u8,
    pub comment: String,
    pub user_name: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub products_loaded: usize,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server
    pub async fn run(self) -> Result<()> {
        let config = self.app_state.config.clone();
        let bind_addr = format!("{}:{}", config.server.host, config.server.port);
        let enable_cors = config.server.enable_cors;
        let workers = config.server.workers;

        tracing::info!("Starting API server on {}", bind_addr);

        let app_state = self.app_state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .wrap(Condition::new(enable_cors, Cors::permissive()))
                .configure(configure_routes)
        })
        .workers(workers)
        .bind(&bind_addr)
        .map_err(|e| internal_error!("Failed to bind server to {}: {}", bind_addr, e))?
        .run();

        server
            .await
            .map_err(|e| internal_error!("Server error: {}", e))?;

        Ok(())
    }
}

/// Route table, shared between the server and the handler tests.
/// Specific product routes register ahead of the `{id}` catch-alls.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/products")
                    .route("", web::get().to(list_products))
                    .route("/featured/list", web::get().to(featured_products))
                    .route("/trending/list", web::get().to(trending_products))
                    .route("/search/{query}", web::get().to(search_products))
                    .route("/category/{category}", web::get().to(products_by_category))
                    .route("/{id}/related", web::get().to(related_products))
                    .route("/{id}/reviews", web::get().to(product_reviews))
                    .route("/{id}/reviews", web::post().to(add_review))
                    .route("/{id}", web::get().to(get_product)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(list_categories))
                    .route("/{id}", web::get().to(get_category)),
            )
            .service(
                web::scope("/ai")
                    .route("/recommendations", web::post().to(recommendations))
                    .route("/search-suggestions", web::get().to(search_suggestions))
                    .route("/smart-search", web::get().to(smart_search))
                    .route("/chat", web::post().to(chat_handler)),
            ),
    )
    .route("/health", web::get().to(health))
    .route("/", web::get().to(index));
}

/// Map an engine error to the storefront's JSON error envelope
fn error_response(err: &CatalogError) -> HttpResponse {
    match err {
        CatalogError::ProductNotFound { .. } => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Product not found" }))
        }
        CatalogError::CategoryNotFound { .. } => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Category not found" }))
        }
        CatalogError::InvalidPageSize { .. } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }))
        }
        _ => {
            tracing::error!("Request failed: {} (category {})", err, err.category());
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": err.to_string() }))
        }
    }
}

/// GET /api/products — filtered, sorted, paginated listing
async fn list_products(
    app_state: web::Data<crate::AppState>,
    params: web::Query<ListParams>,
) -> ActixResult<HttpResponse> {
    let timer = Timer::new("list_products");
    let engine_config = &app_state.config.engine;

    // Reject a zero limit at the boundary; the engine double-checks
    if params.limit == Some(0) {
        return Ok(error_response(&CatalogError::InvalidPageSize {
            page_size: 0,
        }));
    }

    let spec = QuerySpec {
        category: CategoryFilter::from_param(params.category.as_deref()),
        search: params.search.clone(),
        min_price: params.min_price.unwrap_or(0),
        max_price: params.max_price.unwrap_or(i64::MAX),
        in_stock_only: params.in_stock.unwrap_or(false),
        sort: SortKey::from_param(params.sort_by.as_deref()),
        page: params.page.filter(|p| *p > 0).unwrap_or(1),
        page_size: params
            .limit
            .unwrap_or(engine_config.default_page_size)
            .min(engine_config.max_page_size),
    };

    let response = match app_state.engine.list(&spec) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => error_response(&e),
    };
    timer.stop();
    Ok(response)
}

/// GET /api/products/{id}
async fn get_product(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.engine.get(&id) {
        Some(product) => Ok(HttpResponse::Ok().json(product)),
        None => Ok(error_response(&CatalogError::ProductNotFound { id })),
    }
}

/// GET /api/products/search/{query} — unranked containment search
async fn search_products(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let results = app_state.engine.search(&path.into_inner());
    Ok(HttpResponse::Ok().json(results))
}

/// GET /api/products/category/{category}
async fn products_by_category(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let results = app_state.engine.by_category(&path.into_inner());
    Ok(HttpResponse::Ok().json(results))
}

/// GET /api/products/featured/list
async fn featured_products(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.engine.featured()))
}

/// GET /api/products/trending/list
async fn trending_products(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.engine.trending()))
}

/// GET /api/products/{id}/related
async fn related_products(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match app_state.engine.related(&path.into_inner()) {
        Ok(products) => Ok(HttpResponse::Ok().json(products)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /api/products/{id}/reviews — the product's sample reviews
async fn product_reviews(
    app_state: web::Data<crate::AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.engine.get(&id) {
        Some(product) => Ok(HttpResponse::Ok().json(&product.reviews)),
        None => Ok(error_response(&CatalogError::ProductNotFound { id })),
    }
}

/// POST /api/products/{id}/reviews — echo-only placeholder, nothing persists
async fn add_review(
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Review added successfully",
        "review": {
            "id": uuid::Uuid::new_v4(),
            "productId": path.into_inner(),
            "rating": body.rating,
            "comment": body.comment,
            "userName": body.user_name,
            "createdAt": chrono::Utc::now(),
        }
    })))
}

/// GET /api/categories
async fn list_categories() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(CATEGORY_LISTING))
}

/// GET /api/categories/{id}
async fn get_category(path: web::Path<String>) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match CATEGORY_LISTING.iter().find(|c| c.id == id) {
        Some(category) => Ok(HttpResponse::Ok().json(category)),
        None => Ok(error_response(&CatalogError::CategoryNotFound { id })),
    }
}

/// POST /api/ai/recommendations
async fn recommendations(
    app_state: web::Data<crate::AppState>,
    body: web::Json<RecommendationRequest>,
) -> ActixResult<HttpResponse> {
    let recommended = app_state.engine.recommend(body.product_id.as_deref());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "recommendations": recommended,
        "algorithm": "collaborative_filtering",
        "confidence": 0.85,
        "explanation": "Based on similar user preferences and product ratings",
    })))
}

/// GET /api/ai/search-suggestions?q=
async fn search_suggestions(
    app_state: web::Data<crate::AppState>,
    params: web::Query<QueryParam>,
) -> ActixResult<HttpResponse> {
    let query = normalize_query(params.q.as_deref().unwrap_or_default()).unwrap_or_default();
    let suggestions = app_state.engine.suggest(&query);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "suggestions": suggestions,
        "query": query,
    })))
}

/// GET /api/ai/smart-search?q=
async fn smart_search(
    app_state: web::Data<crate::AppState>,
    params: web::Query<QueryParam>,
) -> ActixResult<HttpResponse> {
    let timer = Timer::new("smart_search");
    let query = normalize_query(params.q.as_deref().unwrap_or_default()).unwrap_or_default();
    let results = app_state.engine.smart_search(&query);

    let response = HttpResponse::Ok().json(serde_json::json!({
        "products": results,
        "totalResults": results.len(),
        "query": query,
        "aiEnhanced": true,
    }));
    timer.stop();
    Ok(response)
}

/// POST /api/ai/chat
async fn chat_handler(
    app_state: web::Data<crate::AppState>,
    body: web::Json<ChatRequest>,
) -> ActixResult<HttpResponse> {
    let reply = chat::reply(app_state.engine.products(), &body.message);
    Ok(HttpResponse::Ok().json(reply))
}

/// GET /health
async fn health(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        products_loaded: app_state.engine.products().len(),
    }))
}

/// GET / — HTML index of endpoints
async fn index() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Storefront Catalog API</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Storefront Catalog API</h1>
        <p>Demo e-commerce backend serving an in-memory product catalog.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">GET</span> /api/products
            <p>List products with category/search/price/stock filters, sorting, and pagination.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /api/ai/smart-search?q=
            <p>Relevance-scored product search.</p>
        </div>

        <div class="endpoint">
            <span class="method">POST</span> /api/ai/recommendations
            <p>Product recommendations, optionally anchored on a product id.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /health
            <p>Service health and catalog size.</p>
        </div>

        <h2>Example Listing Request</h2>
        <pre>GET /api/products?category=electronics&sortBy=price_low&page=1&limit=20</pre>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::Config;
    use crate::engine::QueryEngine;
    use actix_web::{body::to_bytes, test};
    use std::sync::Arc;

    fn app_state() -> crate::AppState {
        let config = Arc::new(Config::default());
        let catalog = StaticCatalog::load(&config.catalog).unwrap();
        let engine = Arc::new(QueryEngine::new(Arc::new(catalog)));
        crate::AppState { config, engine }
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(app_state()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn body_json(resp: actix_web::dev::ServiceResponse) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_list_products_envelope() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/products?category=electronics&sortBy=price_low")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = body_json(resp).await;
        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 5);
        assert_eq!(products[0]["price"], 8999);
        assert_eq!(body["pagination"]["currentPage"], 1);
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert_eq!(body["pagination"]["totalItems"], 5);
        assert_eq!(body["pagination"]["itemsPerPage"], 20);
    }

    #[actix_web::test]
    async fn test_out_of_range_page() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/products?page=5&limit=20")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert_eq!(body["products"].as_array().unwrap().len(), 0);
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert_eq!(body["pagination"]["totalItems"], 10);
    }

    #[actix_web::test]
    async fn test_zero_limit_rejected() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/products?limit=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid page size: 0");
    }

    #[actix_web::test]
    async fn test_get_product_and_404() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/api/products/product3")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = body_json(resp).await;
        assert_eq!(body["name"], "Luxury Smart Watch");
        assert_eq!(body["originalPrice"], 18999);

        let req = test::TestRequest::get()
            .uri("/api/products/product99")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Product not found");
    }

    #[actix_web::test]
    async fn test_featured_route_not_shadowed_by_id() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/products/featured/list")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = body_json(resp).await;
        assert!(!body.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_smart_search_envelope() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/ai/smart-search?q=camera")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert!(body["aiEnhanced"].as_bool().unwrap());
        assert_eq!(body["query"], "camera");
        let products = body["products"].as_array().unwrap();
        assert_eq!(body["totalResults"], products.len());
        assert!(products[0]["relevanceScore"].as_f64().unwrap() > 0.0);

        // Empty query yields an empty result set, not the full catalog
        let req = test::TestRequest::get()
            .uri("/api/ai/smart-search")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert_eq!(body["products"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_recommendations_with_and_without_anchor() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/ai/recommendations")
            .set_json(serde_json::json!({ "productId": "product3" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        let recs = body["recommendations"].as_array().unwrap();
        assert!(!recs.is_empty());
        assert!(recs.iter().all(|p| p["category"] == "electronics"));

        // Unresolvable anchor silently falls back, never errors
        let req = test::TestRequest::post()
            .uri("/api/ai/recommendations")
            .set_json(serde_json::json!({ "productId": "nope", "userId": "u1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = body_json(resp).await;
        assert!(!body["recommendations"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_search_suggestions() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/ai/search-suggestions?q=head")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        let suggestions = body["suggestions"].as_array().unwrap();
        assert_eq!(suggestions[0]["text"], "Wireless Headphones");
        assert_eq!(suggestions[0]["type"], "product");
    }

    #[actix_web::test]
    async fn test_chat_endpoint() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/ai/chat")
            .set_json(serde_json::json!({ "message": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert!(body["response"].as_str().unwrap().starts_with("Hello!"));
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn test_categories_routes() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/categories").to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 6);

        let req = test::TestRequest::get()
            .uri("/api/categories/toys")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Category not found");
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["products_loaded"], 10);
    }
}
