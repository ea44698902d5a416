//! Service-level tests for rosterd
//!
//! These tests drive the record service against the in-memory mock
//! repository, exercising code assignment, age derivation, uniqueness
//! enforcement, and the duplicate-code retry loop.

use std::sync::Arc;
use uuid::Uuid;

use rosterd::error::Error;
use rosterd::models::{NewStudent, StudentCode, StudentUpdate};
use rosterd::service::StudentService;
use rosterd::test_utils::MockStudentRepository;

fn payload(first_name: &str, last_name: &str) -> NewStudent {
    NewStudent {
        first_name: first_name.to_string(),
        middle_name: None,
        last_name: last_name.to_string(),
        birth_date: "2005-06-15".to_string(),
        address_line1: "12 Lake Road".to_string(),
        address_line2: None,
        city: "Kandy".to_string(),
        district: "Kandy".to_string(),
        contact_number: "0771234567".to_string(),
        email: None,
    }
}

fn service(repo: &MockStudentRepository) -> StudentService {
    StudentService::new(Arc::new(repo.clone()))
}

#[tokio::test]
async fn test_first_student_gets_initial_code() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let student = service.create(payload("Nimal", "Perera")).await.unwrap();

    assert_eq!(student.code.to_string(), "STU_0001");
}

#[tokio::test]
async fn test_codes_are_sequential() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let first = service.create(payload("Nimal", "Perera")).await.unwrap();
    let second = service.create(payload("Kamala", "Silva")).await.unwrap();
    let third = service.create(payload("Ruwan", "Fernando")).await.unwrap();

    assert_eq!(first.code.to_string(), "STU_0001");
    assert_eq!(second.code.to_string(), "STU_0002");
    assert_eq!(third.code.to_string(), "STU_0003");
}

#[tokio::test]
async fn test_code_continues_from_stored_maximum() {
    let repo = MockStudentRepository::new();
    let seeded = payload("Saman", "Jayawardena")
        .validate_fields()
        .unwrap()
        .into_record(Uuid::new_v4(), StudentCode::parse("STU_0042").unwrap());
    repo.add_record(seeded);

    let service = service(&repo);
    let student = service.create(payload("Nimal", "Perera")).await.unwrap();

    assert_eq!(student.code.to_string(), "STU_0043");
}

#[tokio::test]
async fn test_create_derives_age_from_birth_date() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut input = payload("Nimal", "Perera");
    input.birth_date = "2007-01-01".to_string();
    let student = service.create(input).await.unwrap();

    assert_eq!(student.age, 18);

    let fetched = service.get(student.id).await.unwrap();
    assert_eq!(fetched.age, 18);
}

#[tokio::test]
async fn test_create_rejects_invalid_payload_without_storing() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut input = payload("Nimal", "Perera");
    input.contact_number = "12345".to_string();
    input.district = "Atlantis".to_string();

    let err = service.create(input).await.unwrap_err();
    match err {
        Error::Validation(errors) => {
            assert!(errors.has_field("contactNumber"));
            assert!(errors.has_field("district"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    assert!(repo.get_all().is_empty());
}

#[tokio::test]
async fn test_create_rejects_duplicate_email() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut first = payload("Nimal", "Perera");
    first.email = Some("nimal@example.com".to_string());
    service.create(first).await.unwrap();

    // Normalization applies before the uniqueness check
    let mut second = payload("Kamala", "Silva");
    second.email = Some("  NIMAL@Example.com ".to_string());

    let err = service.create(second).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateEmail(_)));
    assert_eq!(repo.get_all().len(), 1);
}

#[tokio::test]
async fn test_multiple_students_without_email_coexist() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    service.create(payload("Nimal", "Perera")).await.unwrap();
    service.create(payload("Kamala", "Silva")).await.unwrap();

    assert_eq!(repo.get_all().len(), 2);
}

#[tokio::test]
async fn test_create_retries_on_code_conflict() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    // One concurrent writer claims the computed code before our insert lands
    repo.stale_code_on_next_inserts(1);

    let student = service.create(payload("Nimal", "Perera")).await.unwrap();
    assert_eq!(student.code.to_string(), "STU_0001");
    assert_eq!(repo.get_all().len(), 1);
}

#[tokio::test]
async fn test_create_surfaces_conflict_after_retry_bound() {
    let repo = MockStudentRepository::new();
    let service = StudentService::with_code_retry_attempts(Arc::new(repo.clone()), 3);

    repo.stale_code_on_next_inserts(3);

    let err = service.create(payload("Nimal", "Perera")).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateCode(_)));
    assert!(repo.get_all().is_empty());
}

#[tokio::test]
async fn test_update_merges_fields_and_keeps_code() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let created = service.create(payload("Nimal", "Perera")).await.unwrap();

    let update = StudentUpdate {
        city: Some("Galle".to_string()),
        ..Default::default()
    };
    let updated = service.update(created.id, update).await.unwrap();

    assert_eq!(updated.city, "Galle");
    assert_eq!(updated.first_name, "Nimal");
    assert_eq!(updated.code, created.code);
}

#[tokio::test]
async fn test_update_recomputes_age_when_birth_date_changes() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut input = payload("Nimal", "Perera");
    input.birth_date = "2007-01-01".to_string();
    let created = service.create(input).await.unwrap();
    assert_eq!(created.age, 18);

    let update = StudentUpdate {
        birth_date: Some("2007-01-02".to_string()),
        ..Default::default()
    };
    let updated = service.update(created.id, update).await.unwrap();

    assert_eq!(updated.age, 17);
}

#[tokio::test]
async fn test_update_rejects_email_held_by_another_record() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut first = payload("Nimal", "Perera");
    first.email = Some("nimal@example.com".to_string());
    service.create(first).await.unwrap();

    let second = service.create(payload("Kamala", "Silva")).await.unwrap();

    let update = StudentUpdate {
        email: Some("nimal@example.com".to_string()),
        ..Default::default()
    };
    let err = service.update(second.id, update).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn test_update_accepts_own_email_unchanged() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let mut input = payload("Nimal", "Perera");
    input.email = Some("nimal@example.com".to_string());
    let created = service.create(input).await.unwrap();

    let update = StudentUpdate {
        email: Some("nimal@example.com".to_string()),
        city: Some("Matara".to_string()),
        ..Default::default()
    };
    let updated = service.update(created.id, update).await.unwrap();

    assert_eq!(updated.email.as_deref(), Some("nimal@example.com"));
    assert_eq!(updated.city, "Matara");
}

#[tokio::test]
async fn test_update_missing_record_returns_not_found() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let err = service
        .update(Uuid::new_v4(), StudentUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_returns_removed_record() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let created = service.create(payload("Nimal", "Perera")).await.unwrap();
    let deleted = service.delete(created.id).await.unwrap();

    assert_eq!(deleted.id, created.id);
    assert!(repo.get_all().is_empty());

    let err = service.get(created.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_missing_record_returns_not_found() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    let err = service.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_filters_case_insensitively() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    service.create(payload("Nimal", "Perera")).await.unwrap();

    let mut other = payload("Kamala", "Silva");
    other.city = "Galle".to_string();
    other.district = "Galle".to_string();
    service.create(other).await.unwrap();

    let results = service.list(Some("KAND")).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].first_name, "Nimal");

    let by_name = service.list(Some("sil")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].last_name, "Silva");
}

#[tokio::test]
async fn test_list_blank_query_returns_everything_in_code_order() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    service.create(payload("Nimal", "Perera")).await.unwrap();
    service.create(payload("Kamala", "Silva")).await.unwrap();

    let results = service.list(Some("   ")).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].code < results[1].code);
}

#[tokio::test]
async fn test_repository_failure_surfaces_as_error() {
    let repo = MockStudentRepository::new();
    let service = service(&repo);

    repo.fail_next_operation("connection reset");
    let result = service.list(None).await;
    assert!(result.is_err());
}
