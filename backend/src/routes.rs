use actix_web::{get, post, web, HttpResponse, Responder};

use crate::error::PredictError;
use crate::models::{ErrorBody, Greeting, WageQuery};
use crate::service::PredictionService;

const JSON_LIMIT: usize = 1024 * 1024;

/// Registers every route plus the JSON extractor config, so malformed bodies
/// come back as `400 {"detail": ...}` like any other validation failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| PredictError::Validation(err.to_string()).into()),
    )
    .service(home)
    .service(predict)
    .service(predict_batch)
    .service(model_info)
    .default_service(web::route().to(not_found));
}

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(Greeting::new())
}

#[post("/predict")]
pub async fn predict(
    service: web::Data<PredictionService>,
    query: web::Json<WageQuery>,
) -> Result<HttpResponse, PredictError> {
    let service = service.into_inner();
    let query = query.into_inner();

    let result = web::block(move || service.predict(query))
        .await
        .map_err(|e| PredictError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(result))
}

#[post("/predict/batch")]
pub async fn predict_batch(
    service: web::Data<PredictionService>,
    queries: web::Json<Vec<WageQuery>>,
) -> Result<HttpResponse, PredictError> {
    let service = service.into_inner();
    let queries = queries.into_inner();
    log::info!("batch prediction requested: {} records", queries.len());

    let results = web::block(move || service.predict_batch(queries))
        .await
        .map_err(|e| PredictError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(results))
}

#[get("/model-info")]
pub async fn model_info(service: web::Data<PredictionService>) -> impl Responder {
    HttpResponse::Ok().json(service.model_info())
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        detail: "not found".to_string(),
    })
}
