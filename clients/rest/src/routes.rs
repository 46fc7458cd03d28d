use actix_cors::Cors;
use actix_web::web;

use crate::{error::ApiError, handlers};

/// Registers the person endpoints under `/api/v1/persons`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/persons")
            .app_data(json_config())
            .service(handlers::create_person)
            .service(handlers::get_persons)
            .service(handlers::get_person_by_id)
            .service(handlers::update_person)
            .service(handlers::delete_person_by_id),
    );
}

/// Bind failures (bad json, wrong types, wrong content type) all answer with the same body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Can not bind request: {}", err);
        ApiError::InvalidBody.into()
    })
}

/// Any origin, credentials allowed
pub fn cors() -> Cors {
    Cors::permissive()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        http::{header, StatusCode},
        test::{self, TestRequest},
        web::Data,
        App,
    };
    use database::{
        model::person::Person,
        persistence::storage::{memory::MemoryStorage, PersonRepository},
    };
    use serde_json::json;

    use super::*;
    use crate::handlers::tests::send;

    fn memory() -> Arc<dyn PersonRepository> {
        Arc::new(MemoryStorage::new())
    }

    #[actix_web::test]
    async fn create_list_delete_scenario() {
        let storage = memory();

        let (status, _) = send(
            storage.clone(),
            TestRequest::post()
                .uri("/api/v1/persons")
                .set_json(json!({ "name": "Ann", "age": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            send(storage.clone(), TestRequest::get().uri("/api/v1/persons")).await;
        assert_eq!(status, StatusCode::OK);

        let persons: Vec<Person> = serde_json::from_slice(&body).unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "Ann");
        assert_eq!(persons[0].age, Some(30));

        let uri = format!("/api/v1/persons/{}", persons[0].id);

        let (status, body) = send(storage.clone(), TestRequest::delete().uri(&uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let (status, _) = send(storage, TestRequest::get().uri(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn created_person_can_be_read_back() {
        let storage = memory();

        let submitted = json!({
            "name": "Ann",
            "age": 30,
            "address": "Street 1",
            "work": "Office"
        });

        send(
            storage.clone(),
            TestRequest::post().uri("/api/v1/persons").set_json(&submitted),
        )
        .await;

        let (status, body) =
            send(storage, TestRequest::get().uri("/api/v1/persons/1")).await;

        assert_eq!(status, StatusCode::OK);

        let mut expected = submitted;
        expected["id"] = json!(1);

        assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap(), expected);
    }

    #[actix_web::test]
    async fn create_ignores_client_id() {
        let storage = memory();

        send(
            storage.clone(),
            TestRequest::post()
                .uri("/api/v1/persons")
                .set_json(json!({ "id": 42, "name": "Ann" })),
        )
        .await;

        let (status, _) =
            send(storage.clone(), TestRequest::get().uri("/api/v1/persons/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(storage, TestRequest::get().uri("/api/v1/persons/1")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn update_persists_under_the_path_id() {
        let storage = memory();

        for name in ["One", "Two", "Three", "Four", "Five"] {
            send(
                storage.clone(),
                TestRequest::post()
                    .uri("/api/v1/persons")
                    .set_json(json!({ "name": name })),
            )
            .await;
        }

        let (status, body) = send(
            storage.clone(),
            TestRequest::patch()
                .uri("/api/v1/persons/5")
                .set_json(json!({ "id": 99, "name": "Updated", "age": 40 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);

        let updated: Person = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.name, "Updated");
        assert_eq!(updated.age, Some(40));

        let (status, body) =
            send(storage.clone(), TestRequest::get().uri("/api/v1/persons/5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Person>(&body).unwrap(), updated);

        let (status, _) = send(storage, TestRequest::get().uri("/api/v1/persons/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn update_of_missing_person_is_not_found() {
        let (status, _) = send(
            memory(),
            TestRequest::patch()
                .uri("/api/v1/persons/3")
                .set_json(json!({ "name": "Ann" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let (status, _) = send(memory(), TestRequest::get().uri("/api/v2/persons")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn cors_allows_any_origin_with_credentials() {
        let app = test::init_service(
            App::new()
                .app_data(Data::from(memory()))
                .configure(configure)
                .wrap(cors()),
        )
        .await;

        let request = TestRequest::get()
            .uri("/api/v1/persons")
            .insert_header((header::ORIGIN, "https://client.example"))
            .to_request();

        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://client.example")
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }
}
