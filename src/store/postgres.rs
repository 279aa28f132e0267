use async_trait::async_trait;
use sqlx::{postgres::PgExecutor, FromRow, PgPool, Postgres, Transaction};

use super::{DocumentStore, Session, StoreError, StoreResult};
use crate::models::{Location, Place, User};

const SELECT_PLACE: &str = r#"
    SELECT id, title, description, address, lat, lng, image, creator
    FROM places
    WHERE id = $1
"#;

const SELECT_PLACE_FOR_UPDATE: &str = r#"
    SELECT id, title, description, address, lat, lng, image, creator
    FROM places
    WHERE id = $1
    FOR UPDATE
"#;

const SELECT_USER: &str = r#"
    SELECT id, name, email, password, image, places
    FROM users
    WHERE id = $1
"#;

const SELECT_USER_FOR_UPDATE: &str = r#"
    SELECT id, name, email, password, image, places
    FROM users
    WHERE id = $1
    FOR UPDATE
"#;

const UPSERT_PLACE: &str = r#"
    INSERT INTO places (id, title, description, address, lat, lng, image, creator)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        description = EXCLUDED.description,
        address = EXCLUDED.address,
        lat = EXCLUDED.lat,
        lng = EXCLUDED.lng,
        image = EXCLUDED.image,
        creator = EXCLUDED.creator
"#;

const UPDATE_PLACE_DETAILS: &str = r#"
    UPDATE places
    SET title = $2, description = $3
    WHERE id = $1
    RETURNING id, title, description, address, lat, lng, image, creator
"#;

const UPSERT_USER: &str = r#"
    INSERT INTO users (id, name, email, password, image, places)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        email = EXCLUDED.email,
        password = EXCLUDED.password,
        image = EXCLUDED.image,
        places = EXCLUDED.places
"#;

#[derive(Debug, FromRow)]
struct PlaceRow {
    id: String,
    title: String,
    description: String,
    address: String,
    lat: f64,
    lng: f64,
    image: Option<String>,
    creator: String,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            id: row.id,
            title: row.title,
            description: row.description,
            location: Location {
                lat: row.lat,
                lng: row.lng,
            },
            address: row.address,
            image: row.image,
            creator: row.creator,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    image: Option<String>,
    places: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            image: row.image,
            places: row.places,
        }
    }
}

async fn fetch_place<'e, E>(executor: E, sql: &str, id: &str) -> StoreResult<Option<Place>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, PlaceRow>(sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Place::from))
}

async fn fetch_user<'e, E>(executor: E, sql: &str, id: &str) -> StoreResult<Option<User>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(User::from))
}

async fn upsert_place<'e, E>(executor: E, place: &Place) -> StoreResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(UPSERT_PLACE)
        .bind(&place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(&place.address)
        .bind(place.location.lat)
        .bind(place.location.lng)
        .bind(&place.image)
        .bind(&place.creator)
        .execute(executor)
        .await?;
    Ok(())
}

async fn upsert_user<'e, E>(executor: E, user: &User) -> StoreResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(UPSERT_USER)
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.image)
        .bind(&user.places[..])
        .execute(executor)
        .await?;
    Ok(())
}

/// PostgreSQL-backed document store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_place(&self, id: &str) -> StoreResult<Option<Place>> {
        fetch_place(&self.pool, SELECT_PLACE, id).await
    }

    async fn find_places_by_creator(&self, creator: &str) -> StoreResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(
            r#"
            SELECT id, title, description, address, lat, lng, image, creator
            FROM places
            WHERE creator = $1
            ORDER BY id
            "#,
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        fetch_user(&self.pool, SELECT_USER, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, image, places
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, image, places
            FROM users
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_place_details(
        &self,
        id: &str,
        title: &str,
        description: &str,
    ) -> StoreResult<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(UPDATE_PLACE_DETAILS)
            .bind(id)
            .bind(title)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Place::from))
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        upsert_user(&self.pool, user).await
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn start_session(&self) -> StoreResult<Box<dyn Session>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx: Some(tx) }))
    }
}

/// A PostgreSQL transaction. Rows read through the session are locked
/// `FOR UPDATE` until commit or abort.
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn tx(&mut self) -> StoreResult<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| StoreError::Unavailable("session already finished".to_string()))
    }
}

#[async_trait]
impl Session for PgSession {
    async fn find_place(&mut self, id: &str) -> StoreResult<Option<Place>> {
        let tx = self.tx()?;
        fetch_place(&mut **tx, SELECT_PLACE_FOR_UPDATE, id).await
    }

    async fn find_user(&mut self, id: &str) -> StoreResult<Option<User>> {
        let tx = self.tx()?;
        fetch_user(&mut **tx, SELECT_USER_FOR_UPDATE, id).await
    }

    async fn save_place(&mut self, place: &Place) -> StoreResult<()> {
        let tx = self.tx()?;
        upsert_place(&mut **tx, place).await
    }

    async fn save_user(&mut self, user: &User) -> StoreResult<()> {
        let tx = self.tx()?;
        upsert_user(&mut **tx, user).await
    }

    async fn remove_place(&mut self, id: &str) -> StoreResult<()> {
        let tx = self.tx()?;
        sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(StoreError::Unavailable(
                "session already finished".to_string(),
            )),
        }
    }

    async fn abort(&mut self) -> StoreResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
