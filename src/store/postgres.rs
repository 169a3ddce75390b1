use crate::configuration::DatabaseSettings;
use crate::domain::{ChatId, Subscriber};
use crate::models::{Chat, NewChat};
use crate::store::{StoreError, SubscriberStore};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

embed_migrations!("migrations");

/// `SubscriberStore` backed by the `chats` table.
///
/// Diesel is blocking, so every operation checks a connection out of the pool
/// on tokio's blocking threads.
#[derive(Clone)]
pub struct PgSubscriberStore {
    pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily connecting pool; the first checkout dials the database.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let manager = ConnectionManager::<PgConnection>::new(settings.connection_string());
        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .build_unchecked(manager);
        Self::new(pool)
    }

    #[tracing::instrument(name = "Run pending database migrations", skip(self))]
    pub async fn migrate(&self) -> anyhow::Result<()> {
        self.run(|conn| {
            embedded_migrations::run(conn).context("Failed to run database migrations.")
        })
        .await
    }

    async fn run<T, F>(&self, query: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PgConnection) -> anyhow::Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn: PooledConnection<ConnectionManager<PgConnection>> = pool
                .get()
                .context("Failed to check out a database connection.")?;
            query(&conn)
        })
        .await
        .context("The database task panicked.")?
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Saving a new chat in the database", skip(self))]
    async fn add(&self, chat_id: ChatId) -> Result<Subscriber, StoreError> {
        let outcome = self
            .run(move |conn| {
                use crate::schema::chats;
                let created_at = Utc::now();
                let chat = diesel::insert_into(chats::table)
                    .values(&NewChat {
                        chat_id: &chat_id.as_i64(),
                        created_at: &created_at,
                    })
                    .get_result::<Chat>(conn)?;
                Ok(chat)
            })
            .await;

        match outcome {
            Ok(chat) => Ok(chat.into()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(chat_id)),
            Err(e) => Err(StoreError::Unexpected(
                e.context("Failed to insert a chat into the database."),
            )),
        }
    }

    #[tracing::instrument(name = "Removing a chat from the database", skip(self))]
    async fn remove(&self, chat_id: ChatId) -> Result<bool, StoreError> {
        let removed = self
            .run(move |conn| {
                use crate::schema::chats;
                let rows = diesel::delete(chats::table.filter(chats::chat_id.eq(chat_id.as_i64())))
                    .execute(conn)
                    .context("Failed to delete a chat from the database.")?;
                Ok(rows > 0)
            })
            .await?;
        Ok(removed)
    }

    #[tracing::instrument(name = "Reading a chat from the database", skip(self))]
    async fn get(&self, chat_id: ChatId) -> Result<Subscriber, StoreError> {
        let chat = self
            .run(move |conn| {
                use crate::schema::chats;
                chats::table
                    .find(chat_id.as_i64())
                    .first::<Chat>(conn)
                    .optional()
                    .context("Failed to read a chat from the database.")
            })
            .await?;
        chat.map(Subscriber::from)
            .ok_or(StoreError::NotFound(chat_id))
    }

    #[tracing::instrument(name = "Listing subscribed chats", skip(self))]
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        let chats = self
            .run(|conn| {
                use crate::schema::chats;
                chats::table
                    .order(chats::created_at.asc())
                    .load::<Chat>(conn)
                    .context("Failed to list chats from the database.")
            })
            .await?;
        Ok(chats.into_iter().map(Subscriber::from).collect())
    }
}
