use actix_web::{
    delete, get, patch, post,
    web::{self, Data, Json, Path},
    HttpResponse,
};
use database::{
    consts::consts::PersonId,
    model::person::{NewPerson, PersonRequest},
    persistence::storage::{PersonRepository, StorageError, StorageResult},
};
use serde_json::json;

use crate::error::ApiError;

pub type Repository = Data<dyn PersonRepository>;

/// Runs a store call on the blocking pool, store calls may block on I/O
async fn call_repository<T, F>(repository: &Repository, f: F) -> Result<StorageResult<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn PersonRepository) -> StorageResult<T> + Send + 'static,
{
    let repository = repository.clone();

    web::block(move || f(repository.get_ref()))
        .await
        .map_err(|e| {
            log::error!("Blocking pool failed to run store call: {}", e);
            ApiError::Internal
        })
}

fn parse_id(raw: &str) -> Result<PersonId, ApiError> {
    raw.parse::<PersonId>().map_err(|e| {
        log::warn!("Can not parse id [{}]: {}", raw, e);
        ApiError::InvalidId
    })
}

fn validate(body: PersonRequest) -> Result<NewPerson, ApiError> {
    NewPerson::try_from(body).map_err(|e| {
        log::warn!("Validation error: {}", e);
        ApiError::Validation(e)
    })
}

fn store_failure(e: StorageError) -> ApiError {
    log::error!("Database error: {}", e);
    ApiError::Internal
}

fn lookup_failure(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(id) => {
            log::warn!("Person not found [id: {}]", id);
            ApiError::NotFound
        }
        e => store_failure(e),
    }
}

/// Lists every stored person in store order
#[get("")]
pub async fn get_persons(repository: Repository) -> Result<HttpResponse, ApiError> {
    let persons = call_repository(&repository, |r| r.get_all_persons())
        .await?
        .map_err(store_failure)?;

    Ok(HttpResponse::Ok().json(persons))
}

/// Stores a new person. The assigned id is not returned to the caller.
#[post("")]
pub async fn create_person(
    repository: Repository,
    body: Json<PersonRequest>,
) -> Result<HttpResponse, ApiError> {
    let person = validate(body.into_inner())?;

    let created = call_repository(&repository, move |r| r.create_person(person))
        .await?
        .map_err(store_failure)?;

    log::info!("Created person [id: {}]", created.id);

    Ok(HttpResponse::Created().json(json!({})))
}

#[get("/{id}")]
pub async fn get_person_by_id(
    repository: Repository,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;

    let person = call_repository(&repository, move |r| r.get_person_by_id(id))
        .await?
        .map_err(lookup_failure)?;

    Ok(HttpResponse::Ok().json(person))
}

/// Overwrites the person stored under the path id and returns the stored record. Any id in
/// the body is replaced by the path id.
#[patch("/{id}")]
pub async fn update_person(
    repository: Repository,
    id: Path<String>,
    body: Json<PersonRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    let person = validate(body.into_inner())?.with_id(id);

    call_repository(&repository, move |r| r.update_person_by_id(id, person))
        .await?
        .map_err(lookup_failure)?;

    // The update is already committed, a failed read back still reports a server error
    let person = call_repository(&repository, move |r| r.get_person_by_id(id))
        .await?
        .map_err(store_failure)?;

    Ok(HttpResponse::Ok().json(person))
}

/// Not-found is not told apart from other store failures here
#[delete("/{id}")]
pub async fn delete_person_by_id(
    repository: Repository,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;

    call_repository(&repository, move |r| r.delete_person_by_id(id))
        .await?
        .map_err(store_failure)?;

    Ok(HttpResponse::NoContent().finish())
}
