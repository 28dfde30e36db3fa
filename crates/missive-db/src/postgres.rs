// ============================================================================
// PostgreSQL store
// ============================================================================
//
// Every operation is one SQL statement. Writes that need the joined
// participant rows use a data-modifying CTE so the row and its projection
// come back from the same statement.
//
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use missive_config::DbConfig;
use missive_error::{AppError, AppResult};
use missive_types::{
    normalize_email, Message, MessageDetails, MessageStatus, NewMessage, NewUser, Participant,
    Permission, StatusChange, User, UserChanges,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::{MessageFilter, MessageStore, StatusFilter, Store, UserStore};

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, db_config: &DbConfig) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(db_config.idle_timeout_secs)))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const USER_COLUMNS: &str = "id, name, email, credential_hash, token, permission, created_at";

const MESSAGE_SELECT: &str = r#"
    SELECT
        m.id, m.title, m.content, m.sender_id, m.receiver_id, m.status,
        m.created_at, m.read_at, m.archived_at,
        s.name AS sender_name, s.email AS sender_email,
        r.name AS receiver_name, r.email AS receiver_email
    FROM m
    JOIN users s ON s.id = m.sender_id
    JOIN users r ON r.id = m.receiver_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    credential_hash: String,
    token: String,
    permission: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let permission = Permission::from_i16(row.permission).ok_or_else(|| {
            AppError::internal(format!("unknown permission code {}", row.permission))
        })?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            credential_hash: row.credential_hash,
            token: row.token,
            permission,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    title: String,
    content: String,
    sender_id: Uuid,
    receiver_id: Uuid,
    status: i16,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
    sender_name: String,
    sender_email: String,
    receiver_name: String,
    receiver_email: String,
}

impl TryFrom<MessageRow> for MessageDetails {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let status = MessageStatus::from_i16(row.status)
            .ok_or_else(|| AppError::internal(format!("unknown status code {}", row.status)))?;
        Ok(MessageDetails {
            sender: Participant {
                id: row.sender_id,
                name: row.sender_name,
                email: row.sender_email,
            },
            receiver: Participant {
                id: row.receiver_id,
                name: row.receiver_name,
                email: row.receiver_email,
            },
            message: Message {
                id: row.id,
                title: row.title,
                content: row.content,
                sender_id: row.sender_id,
                receiver_id: row.receiver_id,
                status,
                created_at: row.created_at,
                read_at: row.read_at,
                archived_at: row.archived_at,
            },
        })
    }
}

/// Translates constraint violations into validation errors; everything else
/// stays a database error.
fn map_db_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        let reason = match (db_err.code().as_deref(), db_err.constraint()) {
            (Some("23505"), Some("users_email_key")) => Some("Email has already been taken"),
            (Some("23505"), Some("users_token_key")) => Some("Token has already been taken"),
            (Some("23505"), _) => Some("Record is not unique"),
            (Some("23503"), Some("messages_receiver_id_fkey")) => Some("Receiver must exist"),
            (Some("23503"), Some("messages_sender_id_fkey")) => Some("Sender must exist"),
            (Some("23503"), _) => Some("Referenced record must exist"),
            (Some("23502"), _) | (Some("23514"), _) => Some("Record is invalid"),
            _ => None,
        };
        if let Some(reason) = reason {
            return AppError::validation(reason);
        }
    }
    AppError::Database(err)
}

/// `(status =, status <>)` bind pair for a status filter
fn status_binds(filter: StatusFilter) -> (Option<i16>, Option<i16>) {
    match filter {
        StatusFilter::Any => (None, None),
        StatusFilter::Active => (None, Some(MessageStatus::Archived.as_i16())),
        StatusFilter::Only(status) => (Some(status.as_i16()), None),
    }
}

const FILTER_CLAUSE: &str = r#"
    ($1::uuid IS NULL OR m.receiver_id = $1)
    AND ($2::uuid IS NULL OR m.sender_id = $2)
    AND ($3::smallint IS NULL OR m.status = $3)
    AND ($4::smallint IS NULL OR m.status <> $4)
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;

        let sql = format!(
            r#"
            INSERT INTO users (id, name, email, credential_hash, token, permission)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_user.name.trim())
            .bind(normalize_email(&new_user.email))
            .bind(&new_user.credential_hash)
            .bind(&new_user.token)
            .bind(new_user.permission.as_i16())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.try_into()
    }

    async fn find_user_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE token = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        changes.validate()?;

        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                credential_hash = COALESCE($4, credential_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(changes.email.as_deref().map(normalize_email))
            .bind(changes.credential_hash.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.ok_or_else(|| AppError::not_found("User", id))?
            .try_into()
    }

    async fn replace_token(&self, id: Uuid, token: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User", id));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn create_message(&self, new_message: NewMessage) -> AppResult<MessageDetails> {
        new_message.validate()?;
        let receiver_id = new_message
            .receiver_id
            .ok_or_else(|| AppError::validation("Receiver must exist"))?;

        let sql = format!(
            r#"
            WITH m AS (
                INSERT INTO messages (id, title, content, sender_id, receiver_id, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            {MESSAGE_SELECT}
            "#
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_message.title)
            .bind(&new_message.content)
            .bind(new_message.sender_id)
            .bind(receiver_id)
            .bind(MessageStatus::Unread.as_i16())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.try_into()
    }

    async fn find_messages(&self, filter: &MessageFilter) -> AppResult<Vec<MessageDetails>> {
        let (status_eq, status_ne) = status_binds(filter.status);
        let sql = format!(
            r#"
            WITH m AS (SELECT * FROM messages m WHERE {FILTER_CLAUSE})
            {MESSAGE_SELECT}
            ORDER BY m.created_at DESC, m.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(filter.receiver_id)
            .bind(filter.sender_id)
            .bind(status_eq)
            .bind(status_ne)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MessageDetails::try_from).collect()
    }

    async fn count_messages(&self, filter: &MessageFilter) -> AppResult<i64> {
        let (status_eq, status_ne) = status_binds(filter.status);
        let sql = format!("SELECT COUNT(*) FROM messages m WHERE {FILTER_CLAUSE}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.receiver_id)
            .bind(filter.sender_id)
            .bind(status_eq)
            .bind(status_ne)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_received_message(
        &self,
        receiver_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<MessageDetails>> {
        let sql = format!(
            r#"
            WITH m AS (SELECT * FROM messages WHERE id = $1 AND receiver_id = $2)
            {MESSAGE_SELECT}
            "#
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .bind(receiver_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MessageDetails::try_from).transpose()
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<MessageDetails>> {
        let sql = format!(
            r#"
            WITH m AS (
                UPDATE messages
                SET status = $2, read_at = $3, archived_at = $4
                WHERE id = $1 AND status = $5
                RETURNING *
            )
            {MESSAGE_SELECT}
            "#
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .bind(change.to.as_i16())
            .bind(change.read_at)
            .bind(change.archived_at)
            .bind(change.from.as_i16())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(MessageDetails::try_from).transpose()
    }

    async fn archive_received(
        &self,
        receiver_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = $3, archived_at = COALESCE(archived_at, $4)
            WHERE receiver_id = $1 AND id = ANY($2) AND status <> $3
            "#,
        )
        .bind(receiver_id)
        .bind(ids)
        .bind(MessageStatus::Archived.as_i16())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
