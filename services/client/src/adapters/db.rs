//! services/client/src/adapters/db.rs
//!
//! This module contains the remote database adapter, which is the concrete
//! implementation of the `RemoteStoreService` port from the `core` crate.
//! It talks to the hosted backend's `profiles` and `notifications` tables
//! over PostgreSQL using `sqlx`.

use async_trait::async_trait;
use readshelf_core::domain::ReadingData;
use readshelf_core::ports::{
    NotificationRecord, PortError, PortResult, RemoteProfile, RemoteStoreService,
};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `RemoteStoreService` port.
#[derive(Clone)]
pub struct RemoteDbAdapter {
    pool: PgPool,
}

impl RemoteDbAdapter {
    /// Creates a new `RemoteDbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    reading_data: Option<JsonValue>,
    reader_name: Option<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> RemoteProfile {
        RemoteProfile {
            reading_data: self.reading_data,
            reader_name: self.reader_name,
        }
    }
}

//=========================================================================================
// `RemoteStoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteStoreService for RemoteDbAdapter {
    async fn fetch_profile(&self, user_id: &str) -> PortResult<Option<RemoteProfile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT reading_data, reader_name FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.map(ProfileRecord::to_domain))
    }

    async fn save_reading_data(
        &self,
        user_id: &str,
        data: &ReadingData,
        reader_name: &str,
    ) -> PortResult<()> {
        let blob = serde_json::to_value(data).map_err(|e| PortError::Unexpected(e.to_string()))?;
        sqlx::query(
            "INSERT INTO profiles (user_id, reading_data, reader_name, updated_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET reading_data = EXCLUDED.reading_data, \
                 reader_name = EXCLUDED.reader_name, \
                 updated_at = now()",
        )
        .bind(user_id)
        .bind(&blob)
        .bind(reader_name)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn insert_notification(&self, record: NotificationRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, type, source_user_id, data) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(&record.user_id)
        .bind(&record.notification_type)
        .bind(&record.source_user_id)
        .bind(&record.data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
