use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::{
    ContactQuery, ContactsResponse, CsvPhotoMode, ImportResponse, PhotoUploadResponse,
};
use tracing::info;

use crate::error::ApiError;
use crate::helpers::multipart::read_form;
use crate::services::{ExportDocument, ExportFormat, InterchangeService, ServiceError};

/// Filters shared by listing and export, named as the web client sends them.
#[derive(Debug, Deserialize)]
pub struct FilterParams {
    search: Option<String>,
    category: Option<String>,
    #[serde(rename = "hasBirthday")]
    has_birthday: Option<String>,
}

impl FilterParams {
    fn to_query(&self) -> ContactQuery {
        ContactQuery {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            category_id: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            has_birthday: self
                .has_birthday
                .as_deref()
                .map(|v| {
                    let v = v.trim();
                    v == "1" || v.eq_ignore_ascii_case("true")
                })
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    user_id: Option<String>,
    #[serde(flatten)]
    filters: FilterParams,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(flatten)]
    filters: FilterParams,
    filename: Option<String>,
    photos: Option<CsvPhotoMode>,
}

pub async fn list_contacts(
    service: web::Data<InterchangeService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ServiceError::MissingUserId)?;

    let contacts = service
        .contacts()
        .query(user_id, &query.filters.to_query())
        .await
        .map_err(ServiceError::Storage)?;

    Ok(HttpResponse::Ok().json(ContactsResponse { contacts }))
}

pub async fn import_contacts(
    service: web::Data<InterchangeService>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_form(payload).await?;

    let user_id = form
        .field("user_id")
        .map(String::from)
        .ok_or(ServiceError::MissingUserId)?;
    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    info!(
        "Importing {} ({} bytes) for user {}",
        file.filename,
        file.bytes.len(),
        user_id
    );

    let summary = service
        .import_contacts(&file.filename, &file.bytes, &user_id)
        .await?;

    Ok(HttpResponse::Created().json(ImportResponse {
        message: "Contacts imported successfully".to_string(),
        count: summary.imported,
        errors: summary.errors,
    }))
}

pub async fn export_csv(
    service: web::Data<InterchangeService>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let format = ExportFormat::Csv(query.photos.unwrap_or_default());
    export(service, path.into_inner(), format, query.into_inner()).await
}

pub async fn export_vcf(
    service: web::Data<InterchangeService>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    export(service, path.into_inner(), ExportFormat::Vcf, query.into_inner()).await
}

async fn export(
    service: web::Data<InterchangeService>,
    user_id: String,
    format: ExportFormat,
    query: ExportQuery,
) -> Result<HttpResponse, ApiError> {
    let document = service
        .export_contacts(
            &user_id,
            format,
            &query.filters.to_query(),
            query.filename.as_deref(),
        )
        .await?;

    Ok(attachment(document))
}

fn attachment(document: ExportDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(format!("{}; charset=utf-8", document.content_type))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
        ))
        .body(document.body)
}

pub async fn upload_photo(
    service: web::Data<InterchangeService>,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let contact_id = path.into_inner();
    let mut form = read_form(payload).await?;

    let user_id = form
        .field("user_id")
        .map(String::from)
        .ok_or(ServiceError::MissingUserId)?;
    let photo = form
        .take_file("photo")
        .ok_or_else(|| ApiError::BadRequest("No photo uploaded".to_string()))?;

    let photo_url = service
        .upload_contact_photo(&user_id, contact_id, photo.bytes)
        .await?;

    Ok(HttpResponse::Created().json(PhotoUploadResponse { photo_url }))
}
