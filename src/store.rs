use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::StoreError;
use crate::model::user::{NewUser, UserRow};

/// Persistence seam for user records. Handlers only see this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRow>, StoreError>;

    /// Inserts one record and commits before returning.
    async fn insert_user(&self, user: &NewUser) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await?;

        info!(max_connections = config.max_connections, "🔌 Connected to Postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT full_name, email, country_code, phone, dob, gender FROM users",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<(), StoreError> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (full_name, email, country_code, phone, dob, gender) VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.country_code)
        .bind(&user.phone)
        .bind(user.dob)
        .bind(&user.gender)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
