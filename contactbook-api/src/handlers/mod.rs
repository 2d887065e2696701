use actix_web::web;

pub mod contacts;
pub mod photos;

/// Registers the contact interchange routes and photo serving.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/contacts", web::get().to(contacts::list_contacts))
        .route("/contacts/import", web::post().to(contacts::import_contacts))
        .route(
            "/contacts/export/csv/{user_id}",
            web::get().to(contacts::export_csv),
        )
        .route(
            "/contacts/export/vcf/{user_id}",
            web::get().to(contacts::export_vcf),
        )
        .route("/contacts/{id}/photo", web::post().to(contacts::upload_photo))
        .route("/photos/{key:.*}", web::get().to(photos::get_photo));
}
