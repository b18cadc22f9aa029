use sqlx::SqlitePool;

use crate::models::entities::User;

pub struct UserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: row.password,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const SELECT_COLS: &str = "id, username, password";

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Insert a user. Ids are assigned sequentially by SQLite.
    pub async fn create(&self, username: &str, password: &str) -> Result<User, CreateUserError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, password) VALUES (?, ?) RETURNING {SELECT_COLS}"
        ))
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(CreateUserError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// User whose username and password both match exactly.
    pub async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .get_by_username(username)
            .await?
            .filter(|u| u.password == password))
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }
}
