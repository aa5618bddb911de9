//! Integration tests for template, form and archived PDF repositories
//! using in-memory SurrealDB. The recurring theme is tenant isolation:
//! every lookup is scoped by studio and a foreign studio ID must come up
//! empty even with a valid record ID.

use chrono::{Duration, Utc};
use inkform_core::models::archived_pdf::{ArchivedPdfFilter, CreateArchivedPdf};
use inkform_core::models::form::{CreateForm, FormStatus, UpdateForm};
use inkform_core::models::template::{CreateTemplate, UpdateTemplate};
use inkform_core::repository::{
    ArchivedPdfRepository, FormRepository, Pagination, TemplateRepository,
};
use inkform_db::repository::{
    SurrealArchivedPdfRepository, SurrealFormRepository, SurrealTemplateRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    inkform_db::run_migrations(&db).await.unwrap();
    db
}

fn new_template(studio_id: Uuid, name: &str) -> CreateTemplate {
    CreateTemplate {
        studio_id,
        name: name.into(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: None,
        schema: serde_json::json!({"fields": []}),
        is_default: false,
        created_by: None,
    }
}

fn new_form(studio_id: Uuid, template_id: Uuid, client: &str) -> CreateForm {
    CreateForm {
        studio_id,
        template_id,
        client_name: client.into(),
        client_email: None,
        client_phone: None,
        client_fiscal_code: None,
        form_data: None,
        signatures: None,
        status: None,
        form_number: None,
        notes: None,
        created_by: None,
    }
}

fn new_pdf(studio_id: Uuid, form_id: Uuid, template_id: Uuid, client: &str) -> CreateArchivedPdf {
    CreateArchivedPdf {
        studio_id,
        form_id,
        template_id,
        file_path: format!("archive/{form_id}.pdf"),
        file_name: format!("{client}.pdf"),
        file_size: 128_000,
        file_hash: None,
        mime_type: "application/pdf".into(),
        client_name: client.into(),
        client_email: None,
        client_fiscal_code: None,
        form_date: Utc::now(),
        form_type: "tattoo_consent".into(),
        metadata: None,
        is_encrypted: false,
        created_by: None,
    }
}

#[tokio::test]
async fn template_crud_and_soft_delete() {
    let db = setup().await;
    let repo = SurrealTemplateRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template = repo
        .create(new_template(studio_id, "Tattoo Consent"))
        .await
        .unwrap();
    assert!(template.is_active);
    assert!(!template.is_default);

    let updated = repo
        .update(
            studio_id,
            template.id,
            UpdateTemplate {
                name: None,
                slug: None,
                description: Some("standard consent form".into()),
                schema: None,
                is_default: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(updated.is_default);
    assert_eq!(updated.name, "Tattoo Consent");

    repo.soft_delete(studio_id, template.id).await.unwrap();
    let listed = repo.list_active(studio_id).await.unwrap();
    assert!(listed.is_empty());

    // A soft-deleted template stays readable by ID.
    let stored = repo.get_by_id(studio_id, template.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn template_is_invisible_to_other_studios() {
    let db = setup().await;
    let repo = SurrealTemplateRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template = repo
        .create(new_template(studio_id, "Piercing Consent"))
        .await
        .unwrap();

    let foreign = repo.get_by_id(Uuid::new_v4(), template.id).await.unwrap();
    assert!(foreign.is_none());
}

#[tokio::test]
async fn form_lifecycle_draft_to_signed() {
    let db = setup().await;
    let repo = SurrealFormRepository::new(db);

    let studio_id = Uuid::new_v4();
    let form = repo
        .create(new_form(studio_id, Uuid::new_v4(), "Mario Rossi"))
        .await
        .unwrap();
    assert_eq!(form.status, FormStatus::Draft);

    let signed = repo
        .update(
            studio_id,
            form.id,
            UpdateForm {
                client_name: None,
                client_email: None,
                client_phone: None,
                client_fiscal_code: None,
                form_data: Some(serde_json::json!({"age": 30})),
                signatures: Some(serde_json::json!([
                    {"fieldId": "client_signature", "imageData": "data:image/png;base64,..."}
                ])),
                status: Some(FormStatus::Signed),
                form_number: None,
                notes: None,
                completed_at: None,
                signed_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert_eq!(signed.status, FormStatus::Signed);
    assert!(signed.signed_at.is_some());
    assert_eq!(signed.client_name, "Mario Rossi");
}

#[tokio::test]
async fn form_listing_is_paginated_and_scoped() {
    let db = setup().await;
    let repo = SurrealFormRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    for i in 0..5 {
        repo.create(new_form(studio_id, template_id, &format!("Client {i}")))
            .await
            .unwrap();
    }
    repo.create(new_form(Uuid::new_v4(), template_id, "Someone Else"))
        .await
        .unwrap();

    let page = repo
        .list_by_studio(
            studio_id,
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 3);

    let rest = repo
        .list_by_studio(
            studio_id,
            Pagination {
                offset: 3,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
}

#[tokio::test]
async fn form_search_is_case_insensitive() {
    let db = setup().await;
    let repo = SurrealFormRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    repo.create(new_form(studio_id, template_id, "Mario Rossi"))
        .await
        .unwrap();
    repo.create(new_form(studio_id, template_id, "Luigi Verdi"))
        .await
        .unwrap();

    let hits = repo.search_by_client_name(studio_id, "ROSSI").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].client_name, "Mario Rossi");
}

#[tokio::test]
async fn form_date_range_listing() {
    let db = setup().await;
    let repo = SurrealFormRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    repo.create(new_form(studio_id, template_id, "Recent"))
        .await
        .unwrap();

    let now = Utc::now();
    let this_week = repo
        .list_by_date_range(studio_id, now - Duration::days(7), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(this_week.len(), 1);

    let last_year = repo
        .list_by_date_range(
            studio_id,
            now - Duration::days(365),
            now - Duration::days(300),
        )
        .await
        .unwrap();
    assert!(last_year.is_empty());
}

#[tokio::test]
async fn form_delete_is_studio_scoped() {
    let db = setup().await;
    let repo = SurrealFormRepository::new(db);

    let studio_id = Uuid::new_v4();
    let form = repo
        .create(new_form(studio_id, Uuid::new_v4(), "Mario Rossi"))
        .await
        .unwrap();

    // Wrong studio: nothing happens.
    repo.delete(Uuid::new_v4(), form.id).await.unwrap();
    assert!(repo.get_by_id(studio_id, form.id).await.unwrap().is_some());

    repo.delete(studio_id, form.id).await.unwrap();
    assert!(repo.get_by_id(studio_id, form.id).await.unwrap().is_none());
}

#[tokio::test]
async fn archived_pdf_create_and_lookup_by_form() {
    let db = setup().await;
    let repo = SurrealArchivedPdfRepository::new(db);

    let studio_id = Uuid::new_v4();
    let form_id = Uuid::new_v4();
    let pdf = repo
        .create(new_pdf(studio_id, form_id, Uuid::new_v4(), "Mario Rossi"))
        .await
        .unwrap();
    assert_eq!(pdf.mime_type, "application/pdf");

    let by_form = repo.get_by_form(studio_id, form_id).await.unwrap().unwrap();
    assert_eq!(by_form.id, pdf.id);

    assert!(repo.get_by_form(Uuid::new_v4(), form_id).await.unwrap().is_none());
}

#[tokio::test]
async fn archived_pdf_search_filters_compose() {
    let db = setup().await;
    let repo = SurrealArchivedPdfRepository::new(db);

    let studio_id = Uuid::new_v4();
    let template_a = Uuid::new_v4();
    let template_b = Uuid::new_v4();
    repo.create(new_pdf(studio_id, Uuid::new_v4(), template_a, "Mario Rossi"))
        .await
        .unwrap();
    repo.create(new_pdf(studio_id, Uuid::new_v4(), template_a, "Luigi Verdi"))
        .await
        .unwrap();
    repo.create(new_pdf(studio_id, Uuid::new_v4(), template_b, "Maria Rosa"))
        .await
        .unwrap();

    let by_name = repo
        .search(
            studio_id,
            ArchivedPdfFilter {
                client_name: Some("mari".into()),
                from: None,
                to: None,
                template_id: None,
                form_type: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_name.total, 2);

    let by_name_and_template = repo
        .search(
            studio_id,
            ArchivedPdfFilter {
                client_name: Some("mari".into()),
                from: None,
                to: None,
                template_id: Some(template_a),
                form_type: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_name_and_template.total, 1);
    assert_eq!(by_name_and_template.items[0].client_name, "Mario Rossi");
}

#[tokio::test]
async fn storage_stats_aggregate() {
    let db = setup().await;
    let repo = SurrealArchivedPdfRepository::new(db);

    let studio_id = Uuid::new_v4();
    for _ in 0..3 {
        repo.create(new_pdf(studio_id, Uuid::new_v4(), Uuid::new_v4(), "Client"))
            .await
            .unwrap();
    }

    let stats = repo.storage_stats(studio_id).await.unwrap();
    assert_eq!(stats.document_count, 3);
    assert_eq!(stats.total_bytes, 3 * 128_000);

    let empty = repo.storage_stats(Uuid::new_v4()).await.unwrap();
    assert_eq!(empty.document_count, 0);
    assert_eq!(empty.total_bytes, 0);
}
