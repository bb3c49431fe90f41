use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use chrono::NaiveDate;
use serde_json::{Value, json};

use boletin_next::cache::ObjectCache;
use boletin_next::cache::object_cache::moka::MokaCacheWrapper;
use boletin_next::models::course_assignments::entities::AssignmentKind;
use boletin_next::models::students::entities::Student;
use boletin_next::models::students::requests::CreateStudentRequest;
use boletin_next::models::users::entities::{User, UserRole};
use boletin_next::models::users::requests::CreateUserRequest;
use boletin_next::routes::configure_api_routes;
use boletin_next::storage::Storage;
use boletin_next::storage::sea_orm_storage::SeaOrmStorage;
use boletin_next::utils::jwt::JwtUtils;

struct School {
    storage: Arc<dyn Storage>,
    teacher: User,
    preceptor: User,
    parent: User,
    ana: Student,
    bruno: Student,
}

async fn school() -> School {
    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());

    let teacher = storage
        .create_user(CreateUserRequest::new("docente", UserRole::Teacher))
        .await
        .unwrap();
    let preceptor = storage
        .create_user(CreateUserRequest::new("preceptora", UserRole::Preceptor))
        .await
        .unwrap();
    let parent = storage
        .create_user(CreateUserRequest::new("familia", UserRole::Parent))
        .await
        .unwrap();

    let ana = storage
        .create_student(CreateStudentRequest {
            enrollment_code: "A-100".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            course: "3B".to_string(),
            parent_user_id: Some(parent.id),
            user_id: None,
        })
        .await
        .unwrap();
    let bruno = storage
        .create_student(CreateStudentRequest {
            enrollment_code: "B-200".to_string(),
            first_name: "Bruno".to_string(),
            last_name: "Ríos".to_string(),
            course: "3B".to_string(),
            parent_user_id: None,
            user_id: None,
        })
        .await
        .unwrap();

    School {
        storage,
        teacher,
        preceptor,
        parent,
        ana,
        bruno,
    }
}

fn bearer(user: &User) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user.id, &user.role.to_string()).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($storage:expr) => {{
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60).unwrap());
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(cache))
                .configure(configure_api_routes),
        )
        .await
    }};
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 2).unwrap()
}

#[actix_web::test]
async fn test_register_map_notifies_only_new_absences() {
    let school = school().await;
    let app = app!(school.storage);

    let payload = json!({
        "curso": "3B",
        "fecha": "2025-05-02",
        "tipo_asistencia": "clases",
        "asistencias": {
            (school.bruno.id.to_string()): "presente",
            "a-100": "ausente",
        },
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/register")
        .insert_header(bearer(&school.teacher))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["guardadas"], 2);
    assert_eq!(body["errores"], 0);
    assert_eq!(body["notificados"], 1);

    // Same submission again: nothing newly absent.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/register")
        .insert_header(bearer(&school.teacher))
        .set_json(&payload)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["guardadas"], 2);
    assert_eq!(body["notificados"], 0);

    let records = school
        .storage
        .find_attendance(&[school.ana.id, school.bruno.id], date(), Some("clases"))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications/unread-count")
        .insert_header(bearer(&school.parent))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["unread_count"], 1);
}

#[actix_web::test]
async fn test_unknown_keys_only_is_bad_request() {
    let school = school().await;
    let app = app!(school.storage);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/register")
        .insert_header(bearer(&school.teacher))
        .set_json(json!({
            "curso": "3B",
            "tipo_asistencia": "clases",
            "asistencias": {"Z-999": "presente"},
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["guardadas"], 0);
    assert_eq!(body["errores"], 1);
}

#[actix_web::test]
async fn test_preceptor_without_assignments_is_denied() {
    let school = school().await;
    let app = app!(school.storage);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/register")
        .insert_header(bearer(&school.preceptor))
        .set_json(json!({
            "curso": "3B",
            "tipo_asistencia": "clases",
            "asistencias": {"A-100": "presente"},
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The teacher has no assignments either but is unrestricted.
    let req = test::TestRequest::get()
        .uri("/api/v1/attendance/courses")
        .insert_header(bearer(&school.teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_justifying_a_presence_is_rejected() {
    let school = school().await;
    school
        .storage
        .create_course_assignment(school.preceptor.id, "3B", AssignmentKind::Preceptor)
        .await
        .unwrap();
    let app = app!(school.storage);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/register")
        .insert_header(bearer(&school.preceptor))
        .set_json(json!({
            "curso": "3B",
            "fecha": "2025-05-02",
            "tipo_asistencia": "clases",
            "asistencias": {"A-100": "presente", "B-200": "ausente"},
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let records = school
        .storage
        .find_attendance(&[school.ana.id, school.bruno.id], date(), Some("clases"))
        .await
        .unwrap();
    let present = records.iter().find(|r| r.student_id == school.ana.id).unwrap();
    let absent = records.iter().find(|r| r.student_id == school.bruno.id).unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/attendance/{}/justify", present.id))
        .insert_header(bearer(&school.preceptor))
        .set_json(json!({"justificada": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/attendance/{}/justify", absent.id))
        .insert_header(bearer(&school.preceptor))
        .set_json(json!({"justificada": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["justificada"], true);
    assert_eq!(body["falta_valor"], 0.0);
}

#[actix_web::test]
async fn test_three_grades_one_notification() {
    let school = school().await;
    let app = app!(school.storage);

    let grade = |subject: &str| {
        json!({
            "alumno_id": school.ana.id,
            "materia": subject,
            "tipo": "evaluacion",
            "calificacion": 8,
            "cuatrimestre": 1,
            "fecha": "2025-05-02",
        })
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/grades/bulk")
        .insert_header(bearer(&school.teacher))
        .set_json(json!({"notas": [grade("Matemática"), grade("Historia"), grade("Física")]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["notificados"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&school.parent))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["unread_count"], 1);
}

#[actix_web::test]
async fn test_requests_without_token_are_rejected() {
    let school = school().await;
    let app = app!(school.storage);

    let req = test::TestRequest::get()
        .uri("/api/v1/attendance/types")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
