use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_postgres::{Client, NoTls, Row};

use crate::{
    consts::consts::PersonId,
    model::person::{NewPerson, Person},
};

use super::{
    network::{start_runtime, BoxFuture, NetworkStorage, Responder},
    PersonRepository, StorageError, StorageResult,
};

const CREATE_PERSONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "public"."persons" (
        "id" serial NOT NULL,
        "name" text NOT NULL,
        "age" int4,
        "address" text,
        "work" text,
        PRIMARY KEY ("id")
    );
"#;

pub enum PgAction {
    List(Responder<Vec<Person>>),
    Create(NewPerson, Responder<Person>),
    Get(PersonId, Responder<Person>),
    Update(PersonId, Person, Responder<()>),
    Delete(PersonId, Responder<()>),
}

/// Person table stored in PostgreSQL. One client connection is opened at start-up and shared
/// by every request for the lifetime of the process.
pub struct PgStorage {
    network_storage: NetworkStorage<PgAction>,
}

impl PgStorage {
    pub fn connect(dsn: String) -> StorageResult<Self> {
        let (action_sender, action_receiver) = mpsc::channel::<PgAction>(16);

        start_runtime(
            "Postgres Tokio",
            action_receiver,
            move || client_fn(dsn),
            task_fn,
        )?;

        Ok(Self {
            network_storage: NetworkStorage { action_sender },
        })
    }
}

impl PersonRepository for PgStorage {
    fn get_all_persons(&self) -> StorageResult<Vec<Person>> {
        self.network_storage.request(PgAction::List)
    }

    fn create_person(&self, person: NewPerson) -> StorageResult<Person> {
        self.network_storage
            .request(|responder| PgAction::Create(person, responder))
    }

    fn get_person_by_id(&self, id: PersonId) -> StorageResult<Person> {
        self.network_storage
            .request(|responder| PgAction::Get(id, responder))
    }

    fn update_person_by_id(&self, id: PersonId, person: Person) -> StorageResult<()> {
        self.network_storage
            .request(|responder| PgAction::Update(id, person, responder))
    }

    fn delete_person_by_id(&self, id: PersonId) -> StorageResult<()> {
        self.network_storage
            .request(|responder| PgAction::Delete(id, responder))
    }
}

fn client_fn(dsn: String) -> BoxFuture<StorageResult<Client>> {
    Box::pin(async move {
        let (client, connection) = tokio_postgres::connect(&dsn, NoTls)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(CREATE_PERSONS_TABLE)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(client)
    })
}

fn task_fn(client: Arc<Client>, action: PgAction) -> BoxFuture<()> {
    Box::pin(async move {
        // The requester may have given up, nobody is left to tell
        match action {
            PgAction::List(responder) => {
                let _ = responder.send(list_persons(&client).await);
            }
            PgAction::Create(person, responder) => {
                let _ = responder.send(insert_person(&client, person).await);
            }
            PgAction::Get(id, responder) => {
                let _ = responder.send(select_person(&client, id).await);
            }
            PgAction::Update(id, person, responder) => {
                let _ = responder.send(update_person(&client, id, person).await);
            }
            PgAction::Delete(id, responder) => {
                let _ = responder.send(delete_person(&client, id).await);
            }
        }
    })
}

fn query_error(e: tokio_postgres::Error) -> StorageError {
    StorageError::Query(e.to_string())
}

fn person_from_row(row: &Row) -> StorageResult<Person> {
    Ok(Person {
        id: PersonId(row.try_get("id").map_err(query_error)?),
        name: row.try_get("name").map_err(query_error)?,
        age: row.try_get("age").map_err(query_error)?,
        address: row.try_get("address").map_err(query_error)?,
        work: row.try_get("work").map_err(query_error)?,
    })
}

async fn list_persons(client: &Client) -> StorageResult<Vec<Person>> {
    let select_persons = r#"
        SELECT "id", "name", "age", "address", "work" FROM "public"."persons";
    "#;

    let rows = client
        .query(select_persons, &[])
        .await
        .map_err(query_error)?;

    rows.iter().map(person_from_row).collect()
}

async fn insert_person(client: &Client, person: NewPerson) -> StorageResult<Person> {
    let insert_person = r#"
        INSERT INTO "public"."persons" ("name", "age", "address", "work")
        VALUES ($1, $2, $3, $4)
        RETURNING "id", "name", "age", "address", "work";
    "#;

    let row = client
        .query_one(
            insert_person,
            &[&person.name, &person.age, &person.address, &person.work],
        )
        .await
        .map_err(query_error)?;

    person_from_row(&row)
}

async fn select_person(client: &Client, id: PersonId) -> StorageResult<Person> {
    let select_person = r#"
        SELECT "id", "name", "age", "address", "work" FROM "public"."persons" WHERE "id" = $1;
    "#;

    let key = id.to_number();

    let row = client
        .query_opt(select_person, &[&key])
        .await
        .map_err(query_error)?;

    match row {
        Some(row) => person_from_row(&row),
        None => Err(StorageError::NotFound(id)),
    }
}

async fn update_person(client: &Client, id: PersonId, person: Person) -> StorageResult<()> {
    let update_person = r#"
        UPDATE "public"."persons"
        SET "name" = $2, "age" = $3, "address" = $4, "work" = $5
        WHERE "id" = $1;
    "#;

    let key = id.to_number();

    let updated = client
        .execute(
            update_person,
            &[&key, &person.name, &person.age, &person.address, &person.work],
        )
        .await
        .map_err(query_error)?;

    if updated == 0 {
        return Err(StorageError::NotFound(id));
    }

    Ok(())
}

async fn delete_person(client: &Client, id: PersonId) -> StorageResult<()> {
    let delete_person = r#"
        DELETE FROM "public"."persons" WHERE "id" = $1;
    "#;

    let key = id.to_number();

    let deleted = client
        .execute(delete_person, &[&key])
        .await
        .map_err(query_error)?;

    if deleted == 0 {
        return Err(StorageError::NotFound(id));
    }

    Ok(())
}
