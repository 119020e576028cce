use super::db_structs::{User, UserRatingChange};
use crate::model::ranking_engine::RatingCountSource;
use itertools::Itertools;
use postgres_types::ToSql;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Postgres(#[from] tokio_postgres::Error)
}

#[derive(Clone)]
pub struct DbClient {
    client: Arc<Client>
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, DbError> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });

        Ok(DbClient {
            client: Arc::new(client)
        })
    }

    /// Number of users per stored rating. Every rating present in the table is
    /// returned, including ones the ranking engine will later ignore.
    pub async fn get_rating_counts(&self) -> Result<HashMap<i32, i64>, DbError> {
        info!("Fetching rating counts...");
        let rows = self
            .client
            .query("SELECT rating, COUNT(*) AS count FROM users GROUP BY rating", &[])
            .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            counts.insert(row.try_get::<_, i32>("rating")?, row.try_get::<_, i64>("count")?);
        }

        info!("Rating counts fetched for {} distinct ratings", counts.len());
        Ok(counts)
    }

    pub async fn count_users(&self) -> Result<i64, DbError> {
        let row = self.client.query_one("SELECT COUNT(*) FROM users", &[]).await?;

        Ok(row.try_get(0)?)
    }

    /// Users ordered from the highest rating down, ties broken by id.
    pub async fn get_users_page(&self, limit: i64, offset: i64) -> Result<Vec<User>, DbError> {
        let rows = self
            .client
            .query(
                "SELECT id, username, rating, updated_at FROM users \
                ORDER BY rating DESC, id ASC LIMIT $1 OFFSET $2",
                &[&limit, &offset]
            )
            .await?;

        rows.iter().map(Self::user_from_row).collect()
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, DbError> {
        let row = self
            .client
            .query_opt("SELECT id, username, rating, updated_at FROM users WHERE id = $1", &[&id])
            .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    /// Random sample of at most `n` users.
    pub async fn sample_users(&self, n: i64) -> Result<Vec<User>, DbError> {
        let rows = self
            .client
            .query(
                "SELECT id, username, rating, updated_at FROM users ORDER BY random() LIMIT $1",
                &[&n]
            )
            .await?;

        rows.iter().map(Self::user_from_row).collect()
    }

    /// Writes every change in a single statement, so the batch lands atomically.
    /// When a user appears more than once, the last change for that user wins.
    ///
    /// Returns the number of rows updated.
    pub async fn update_ratings(&self, changes: &[UserRatingChange]) -> Result<u64, DbError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let (user_ids, ratings): (Vec<i32>, Vec<i32>) = changes
            .iter()
            .rev()
            .unique_by(|c| c.user_id)
            .map(|c| (c.user_id, c.new_rating))
            .unzip();

        let query = "UPDATE users AS u SET rating = c.new_rating, updated_at = now() \
            FROM unnest($1::int4[], $2::int4[]) AS c(user_id, new_rating) \
            WHERE u.id = c.user_id";
        let values: &[&(dyn ToSql + Sync)] = &[&user_ids, &ratings];

        let updated = self.client.execute(query, values).await?;

        debug!("Persisted {} of {} rating changes", updated, changes.len());
        Ok(updated)
    }

    fn user_from_row(row: &Row) -> Result<User, DbError> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            rating: row.try_get("rating")?,
            updated_at: row.try_get("updated_at")?
        })
    }
}

impl RatingCountSource for DbClient {
    type Error = DbError;

    async fn rating_counts(&self) -> Result<HashMap<i32, i64>, DbError> {
        self.get_rating_counts().await
    }
}
