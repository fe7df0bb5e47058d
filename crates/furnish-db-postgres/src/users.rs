//! User repository over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use furnish_core::{NewUser, User, UserId};
use furnish_storage::{StorageError, UserRepository};

use crate::error::map_sqlx;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

type UserRow = (
    i64,
    String,
    String,
    String,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: UserRow) -> Result<User, StorageError> {
    let (id, email, password_hash, name, role, created_at, updated_at) = row;
    let role = role
        .parse()
        .map_err(|err: String| StorageError::internal(err))?;
    Ok(User {
        id,
        email,
        password_hash,
        name,
        role,
        created_at,
        updated_at,
    })
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, StorageError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, name, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let mapped = map_sqlx(err);
                if mapped.is_already_exists() {
                    StorageError::already_exists("user", &user.email)
                } else {
                    mapped
                }
            })?;
        from_row(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(from_row).transpose()
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(from_row).transpose()
    }
}
