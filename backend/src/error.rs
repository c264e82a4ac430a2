use actix_multipart::MultipartError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::inference::InferenceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Model belum dimuat. Periksa log server.")]
    ModelNotLoaded,
    #[error("Tidak ada bagian file dalam permintaan. Pastikan FormData menggunakan nama \"file\".")]
    MissingFile,
    #[error("Tidak ada file yang dipilih")]
    EmptyFilename,
    #[error("Format file tidak didukung. Harap unggah file gambar.")]
    UnsupportedContentType,
    #[error("Gagal membaca unggahan: {0}")]
    Upload(#[from] MultipartError),
    #[error("Ukuran file melebihi batas {limit} byte")]
    PayloadTooLarge { limit: usize },
    #[error("Terjadi kesalahan saat memproses gambar: {0}")]
    Processing(#[from] InferenceError),
    #[error("Terjadi kesalahan saat memproses gambar: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::EmptyFilename
            | ApiError::UnsupportedContentType
            | ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ModelNotLoaded | ApiError::Processing(_) | ApiError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Rejected request: {}", self);
        }
        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
