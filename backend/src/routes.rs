use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use std::sync::Arc;

use crate::error::ApiError;
use crate::inference::{self, model::Classifier, preprocess};

pub const LIVENESS_MESSAGE: &str = "API Klasifikasi Hewan Berjalan (Menggunakan Actix dan Rust)!";

const FILE_FIELD: &str = "file";

pub struct AppState {
    /// `None` when the model failed to load at startup.
    pub classifier: Option<Arc<dyn Classifier>>,
    pub max_upload_bytes: usize,
}

struct UploadedImage {
    filename: String,
    data: Vec<u8>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(LIVENESS_MESSAGE)
}

async fn predict(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let classifier = state.classifier.clone().ok_or(ApiError::ModelNotLoaded)?;
    let UploadedImage { filename, data } =
        read_upload(&mut payload, state.max_upload_bytes).await?;

    let result = web::block(move || inference::classify(classifier.as_ref(), &data)).await??;

    info!(
        "Classified {}: {} ({:.3})",
        filename, result.predicted_class, result.confidence
    );
    Ok(HttpResponse::Ok().json(result))
}

/// Finds the `file` part, validates its filename and content type, and reads it fully.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<UploadedImage, ApiError> {
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::MissingFile),
            Err(e) => {
                warn!("Unreadable multipart body: {}", e);
                return Err(ApiError::MissingFile);
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Parts without a filename are plain form values, not files.
        let Some(filename) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned)
        else {
            continue;
        };

        if filename.is_empty() {
            return Err(ApiError::EmptyFilename);
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();
        preprocess::validate_content_type(&content_type)
            .map_err(|_| ApiError::UnsupportedContentType)?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > limit {
                return Err(ApiError::PayloadTooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadedImage { filename, data });
    }
}
