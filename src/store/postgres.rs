use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ApprovalStore;
use crate::models::approval::{
    ApprovalEvent, ApprovalHistoryEntry, ApprovalStatus, Creator, NewApprovalHistory,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.category, e.venue_name, e.venue_type,
    e.contact_email, e.approval_status, e.approval_token,
    e.approval_token_expires_at, e.approval_responded_at, e.created_at,
    u.id AS creator_id, u.email AS creator_email, u.full_name AS creator_full_name
"#;

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn list_history(&self, event_id: i64) -> anyhow::Result<Vec<ApprovalHistoryEntry>> {
        let rows = sqlx::query_as::<_, ApprovalHistoryEntry>(
            r#"SELECT id, event_id, contact_email, action, ip_address, user_agent, created_at
               FROM event_approval_history
               WHERE event_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ApprovalStore for PgStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT id FROM events LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_event(&self, event_id: i64) -> anyhow::Result<Option<ApprovalEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e LEFT JOIN users u ON u.id = e.created_by WHERE e.id = $1"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<ApprovalEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e LEFT JOIN users u ON u.id = e.created_by WHERE e.approval_token = $1"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn approval_status(&self, event_id: i64) -> anyhow::Result<Option<ApprovalStatus>> {
        let status = sqlx::query_scalar::<_, Option<ApprovalStatus>>(
            "SELECT approval_status FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status.flatten())
    }

    async fn commit_transition(
        &self,
        event_id: i64,
        token: &str,
        status: ApprovalStatus,
        responded_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"UPDATE events
               SET approval_status = $1,
                   approval_responded_at = $2,
                   approval_token = NULL
               WHERE id = $3
                 AND approval_token = $4
                 AND approval_status = 'pending_approval'"#,
        )
        .bind(status)
        .bind(responded_at)
        .bind(event_id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn append_history(&self, entry: &NewApprovalHistory) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO event_approval_history (event_id, contact_email, action, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(entry.event_id)
        .bind(&entry.contact_email)
        .bind(entry.action)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn store_token(
        &self,
        event_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"UPDATE events
               SET approval_status = 'pending_approval',
                   approval_token = $2,
                   approval_token_expires_at = $3,
                   approval_responded_at = NULL
               WHERE id = $1
                 AND (approval_status IS NULL OR approval_status = 'pending_approval')"#,
        )
        .bind(event_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<ApprovalEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e LEFT JOIN users u ON u.id = e.created_by \
             WHERE e.approval_status = 'pending_approval' ORDER BY e.created_at ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ── Row Types ────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    category: String,
    venue_name: Option<String>,
    venue_type: Option<String>,
    contact_email: Option<String>,
    approval_status: Option<ApprovalStatus>,
    approval_token: Option<String>,
    approval_token_expires_at: Option<DateTime<Utc>>,
    approval_responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    creator_id: Option<Uuid>,
    creator_email: Option<String>,
    creator_full_name: Option<String>,
}

impl From<EventRow> for ApprovalEvent {
    fn from(row: EventRow) -> Self {
        let created_by = match (row.creator_id, row.creator_email) {
            (Some(id), Some(email)) => Some(Creator {
                id,
                email,
                full_name: row.creator_full_name,
            }),
            _ => None,
        };

        ApprovalEvent {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            venue_name: row.venue_name,
            venue_type: row.venue_type,
            contact_email: row.contact_email,
            approval_status: row.approval_status,
            approval_token: row.approval_token,
            approval_token_expires_at: row.approval_token_expires_at,
            approval_responded_at: row.approval_responded_at,
            created_by,
            created_at: row.created_at,
        }
    }
}
