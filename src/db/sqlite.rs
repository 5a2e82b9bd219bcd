use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::audit::AuditKind;
use crate::db::models::{
    AuditEntry, BlockedNumber, ColumnText, Hotline, HotlineAdmin, HotlineMember, NewAdmin,
    NewAuditEntry, NewHotline, NewMember, Number, NumberFeatures,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::HotlineError;

pub type SqlitePool = Pool<Sqlite>;

/// Typed access to the hotline tables, over a shared connection pool. Clone
/// is cheap; clones share the pool.
#[derive(Clone)]
pub struct HotlineStorage {
    pool: SqlitePool,
}

impl HotlineStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), HotlineError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- numbers ----

    pub async fn create_number(
        &self,
        number: &str,
        country: &str,
        features: NumberFeatures,
    ) -> Result<Number, HotlineError> {
        let result = sqlx::query("INSERT INTO numbers (number, country, features) VALUES (?, ?, ?)")
            .bind(number)
            .bind(country)
            .bind(features.to_column())
            .execute(&self.pool)
            .await?;
        Ok(Number {
            id: result.last_insert_rowid(),
            number: number.to_string(),
            country: country.to_string(),
            features,
        })
    }

    pub async fn get_number(&self, id: i64) -> Result<Number, HotlineError> {
        let row = sqlx::query("SELECT id, number, country, features FROM numbers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(HotlineError::NotFound("number"))?;
        Self::row_to_number(row)
    }

    pub async fn find_number(&self, number: &str) -> Result<Option<Number>, HotlineError> {
        let row = sqlx::query("SELECT id, number, country, features FROM numbers WHERE number = ?")
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_number).transpose()
    }

    // ---- hotlines ----

    pub async fn create_hotline(&self, new: NewHotline) -> Result<Hotline, HotlineError> {
        let country = new.country.unwrap_or_else(|| "US".to_string());
        let result = sqlx::query(
            "INSERT INTO hotlines (name, slug, country, voice_greeting) VALUES (?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&country)
        .bind(&new.voice_greeting)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::classify_unique(e, &new.slug))?;
        Ok(Hotline {
            id: result.last_insert_rowid(),
            name: new.name,
            slug: new.slug,
            primary_number: None,
            primary_number_id: None,
            country,
            voice_greeting: new.voice_greeting,
        })
    }

    pub async fn get_hotline(&self, slug: &str) -> Result<Hotline, HotlineError> {
        let row = sqlx::query(
            r#"SELECT id, name, slug, primary_number, primary_number_id, country, voice_greeting
               FROM hotlines WHERE slug = ?"#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(HotlineError::NotFound("hotline"))?;
        Self::row_to_hotline(row)
    }

    /// Inbound-call resolution: hotline whose primary number matches the
    /// dialed number text. Uses the `primary_number` index, no join.
    pub async fn get_hotline_by_number(
        &self,
        number: &str,
    ) -> Result<Option<Hotline>, HotlineError> {
        let row = sqlx::query(
            r#"SELECT id, name, slug, primary_number, primary_number_id, country, voice_greeting
               FROM hotlines WHERE primary_number = ?"#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_hotline).transpose()
    }

    pub async fn list_hotlines(&self) -> Result<Vec<Hotline>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, name, slug, primary_number, primary_number_id, country, voice_greeting
               FROM hotlines ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_hotline).collect()
    }

    /// Hotlines the given user administers, via the `user_id` admin index.
    pub async fn list_hotlines_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Hotline>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT h.id, h.name, h.slug, h.primary_number, h.primary_number_id, h.country,
                      h.voice_greeting
               FROM hotlines h
               JOIN hotline_admins a ON a.hotline_id = h.id
               WHERE a.user_id = ?
               ORDER BY h.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_hotline).collect()
    }

    pub async fn update_hotline_details(
        &self,
        slug: &str,
        name: &str,
        voice_greeting: Option<&str>,
    ) -> Result<Hotline, HotlineError> {
        let result = sqlx::query("UPDATE hotlines SET name = ?, voice_greeting = ? WHERE slug = ?")
            .bind(name)
            .bind(voice_greeting)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("hotline"));
        }
        self.get_hotline(slug).await
    }

    /// Point a hotline at a provisioned number. The denormalized number text
    /// and the foreign key are written in one transaction so they never
    /// diverge.
    pub async fn assign_primary_number(
        &self,
        slug: &str,
        number_id: i64,
    ) -> Result<Hotline, HotlineError> {
        let mut tx = self.pool.begin().await?;

        let number: String = sqlx::query("SELECT number FROM numbers WHERE id = ?")
            .bind(number_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(HotlineError::NotFound("number"))?
            .try_get("number")?;

        let result = sqlx::query(
            "UPDATE hotlines SET primary_number = ?, primary_number_id = ? WHERE slug = ?",
        )
        .bind(&number)
        .bind(number_id)
        .bind(slug)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("hotline"));
        }

        tx.commit().await?;
        self.get_hotline(slug).await
    }

    /// Clear a hotline's number assignment. Both columns go NULL in one
    /// statement, same consistency rule as assignment.
    pub async fn release_primary_number(&self, slug: &str) -> Result<Hotline, HotlineError> {
        let result = sqlx::query(
            "UPDATE hotlines SET primary_number = NULL, primary_number_id = NULL WHERE slug = ?",
        )
        .bind(slug)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("hotline"));
        }
        self.get_hotline(slug).await
    }

    /// Delete a hotline and its dependents in one transaction. Members,
    /// admins and blocklist rows go with it; audit entries are retained with
    /// their hotline reference cleared.
    pub async fn delete_hotline(&self, slug: &str) -> Result<(), HotlineError> {
        let mut tx = self.pool.begin().await?;

        let hotline_id: i64 = sqlx::query("SELECT id FROM hotlines WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(HotlineError::NotFound("hotline"))?
            .try_get("id")?;

        for table in ["hotline_members", "hotline_admins", "block_list"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE hotline_id = ?"))
                .bind(hotline_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE audit_log SET hotline_id = NULL WHERE hotline_id = ?")
            .bind(hotline_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM hotlines WHERE id = ?")
            .bind(hotline_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---- members ----

    pub async fn add_member(
        &self,
        hotline_id: i64,
        new: NewMember,
    ) -> Result<HotlineMember, HotlineError> {
        let result = sqlx::query(
            "INSERT INTO hotline_members (hotline_id, name, number, verified) VALUES (?, ?, ?, 0)",
        )
        .bind(hotline_id)
        .bind(&new.name)
        .bind(&new.number)
        .execute(&self.pool)
        .await?;
        Ok(HotlineMember {
            id: result.last_insert_rowid(),
            hotline_id,
            name: new.name,
            number: new.number,
            verified: false,
        })
    }

    /// Member mutations are scoped to the owning hotline; an id belonging to
    /// a different hotline is `NotFound`.
    pub async fn verify_member(&self, hotline_id: i64, id: i64) -> Result<(), HotlineError> {
        let result =
            sqlx::query("UPDATE hotline_members SET verified = 1 WHERE id = ? AND hotline_id = ?")
                .bind(id)
                .bind(hotline_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("member"));
        }
        Ok(())
    }

    pub async fn remove_member(&self, hotline_id: i64, id: i64) -> Result<(), HotlineError> {
        let result = sqlx::query("DELETE FROM hotline_members WHERE id = ? AND hotline_id = ?")
            .bind(id)
            .bind(hotline_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("member"));
        }
        Ok(())
    }

    pub async fn list_members(&self, hotline_id: i64) -> Result<Vec<HotlineMember>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, hotline_id, name, number, verified
               FROM hotline_members WHERE hotline_id = ? ORDER BY id"#,
        )
        .bind(hotline_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_member).collect()
    }

    /// `(hotline, verified)` composite-index lookup.
    pub async fn list_members_by_verified(
        &self,
        hotline_id: i64,
        verified: bool,
    ) -> Result<Vec<HotlineMember>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, hotline_id, name, number, verified
               FROM hotline_members WHERE hotline_id = ? AND verified = ? ORDER BY id"#,
        )
        .bind(hotline_id)
        .bind(verified as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_member).collect()
    }

    /// `(number, verified)` composite-index lookup: every membership held by
    /// a number, across hotlines.
    pub async fn list_memberships_for_number(
        &self,
        number: &str,
        verified: bool,
    ) -> Result<Vec<HotlineMember>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, hotline_id, name, number, verified
               FROM hotline_members WHERE number = ? AND verified = ? ORDER BY id"#,
        )
        .bind(number)
        .bind(verified as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_member).collect()
    }

    pub async fn is_verified_member(
        &self,
        hotline_id: i64,
        number: &str,
    ) -> Result<bool, HotlineError> {
        let row = sqlx::query(
            "SELECT 1 FROM hotline_members WHERE hotline_id = ? AND number = ? AND verified = 1",
        )
        .bind(hotline_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    // ---- admins ----

    pub async fn add_admin(
        &self,
        hotline_id: i64,
        new: NewAdmin,
    ) -> Result<HotlineAdmin, HotlineError> {
        let result = sqlx::query(
            r#"INSERT INTO hotline_admins (hotline_id, user_id, user_name, user_email)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(hotline_id)
        .bind(&new.user_id)
        .bind(&new.user_name)
        .bind(&new.user_email)
        .execute(&self.pool)
        .await?;
        Ok(HotlineAdmin {
            id: result.last_insert_rowid(),
            hotline_id,
            user_id: new.user_id,
            user_name: new.user_name,
            user_email: new.user_email,
        })
    }

    pub async fn remove_admin(&self, hotline_id: i64, id: i64) -> Result<(), HotlineError> {
        let result = sqlx::query("DELETE FROM hotline_admins WHERE id = ? AND hotline_id = ?")
            .bind(id)
            .bind(hotline_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("admin"));
        }
        Ok(())
    }

    pub async fn list_admins(&self, hotline_id: i64) -> Result<Vec<HotlineAdmin>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, hotline_id, user_id, user_name, user_email
               FROM hotline_admins WHERE hotline_id = ? ORDER BY id"#,
        )
        .bind(hotline_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_admin).collect()
    }

    // ---- audit log ----

    pub async fn record_audit(
        &self,
        kind: AuditKind,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, HotlineError> {
        let timestamp = entry.timestamp.unwrap_or_else(Utc::now);
        let result = sqlx::query(
            r#"INSERT INTO audit_log
               (timestamp, kind, description, hotline_id, user, metadata, reporter_number)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(timestamp.to_rfc3339())
        .bind(kind.as_i64())
        .bind(&entry.description)
        .bind(entry.hotline_id)
        .bind(&entry.user)
        .bind(&entry.metadata)
        .bind(&entry.reporter_number)
        .execute(&self.pool)
        .await?;
        Ok(AuditEntry {
            id: result.last_insert_rowid(),
            timestamp,
            kind,
            description: entry.description,
            hotline_id: entry.hotline_id,
            user: entry.user,
            metadata: entry.metadata,
            reporter_number: entry.reporter_number,
        })
    }

    /// Per-hotline history, newest first, over the `(hotline_id, timestamp)`
    /// index.
    pub async fn list_audit(
        &self,
        hotline_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, timestamp, kind, description, hotline_id, user, metadata, reporter_number
               FROM audit_log WHERE hotline_id = ?
               ORDER BY timestamp DESC, id DESC LIMIT ?"#,
        )
        .bind(hotline_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_audit).collect()
    }

    // ---- blocklist ----

    pub async fn block_number(
        &self,
        hotline_id: i64,
        number: &str,
        blocked_by: Option<&str>,
    ) -> Result<BlockedNumber, HotlineError> {
        let timestamp = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO block_list (timestamp, hotline_id, number, blocked_by)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(timestamp.to_rfc3339())
        .bind(hotline_id)
        .bind(number)
        .bind(blocked_by)
        .execute(&self.pool)
        .await?;
        Ok(BlockedNumber {
            id: result.last_insert_rowid(),
            timestamp,
            hotline_id,
            number: number.to_string(),
            blocked_by: blocked_by.map(str::to_owned),
        })
    }

    pub async fn unblock_number(&self, hotline_id: i64, number: &str) -> Result<(), HotlineError> {
        let result = sqlx::query("DELETE FROM block_list WHERE hotline_id = ? AND number = ?")
            .bind(hotline_id)
            .bind(number)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HotlineError::NotFound("blocklist entry"));
        }
        Ok(())
    }

    pub async fn is_blocked(&self, hotline_id: i64, number: &str) -> Result<bool, HotlineError> {
        let row = sqlx::query("SELECT 1 FROM block_list WHERE hotline_id = ? AND number = ?")
            .bind(hotline_id)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn list_blocked(&self, hotline_id: i64) -> Result<Vec<BlockedNumber>, HotlineError> {
        let rows = sqlx::query(
            r#"SELECT id, timestamp, hotline_id, number, blocked_by
               FROM block_list WHERE hotline_id = ? ORDER BY id"#,
        )
        .bind(hotline_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_blocked).collect()
    }

    // ---- row mapping ----

    fn row_to_number(row: SqliteRow) -> Result<Number, HotlineError> {
        let features_raw: String = row.try_get("features")?;
        Ok(Number {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            country: row.try_get("country")?,
            features: NumberFeatures::from_column(&features_raw)?,
        })
    }

    fn row_to_hotline(row: SqliteRow) -> Result<Hotline, HotlineError> {
        Ok(Hotline {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            primary_number: row.try_get("primary_number")?,
            primary_number_id: row.try_get("primary_number_id")?,
            country: row.try_get("country")?,
            voice_greeting: row.try_get("voice_greeting")?,
        })
    }

    fn row_to_member(row: SqliteRow) -> Result<HotlineMember, HotlineError> {
        let verified: i64 = row.try_get("verified")?;
        Ok(HotlineMember {
            id: row.try_get("id")?,
            hotline_id: row.try_get("hotline_id")?,
            name: row.try_get("name")?,
            number: row.try_get("number")?,
            verified: verified != 0,
        })
    }

    fn row_to_admin(row: SqliteRow) -> Result<HotlineAdmin, HotlineError> {
        Ok(HotlineAdmin {
            id: row.try_get("id")?,
            hotline_id: row.try_get("hotline_id")?,
            user_id: row.try_get("user_id")?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
        })
    }

    fn row_to_audit(row: SqliteRow) -> Result<AuditEntry, HotlineError> {
        let kind_raw: i64 = row.try_get("kind")?;
        let timestamp_raw: String = row.try_get("timestamp")?;
        Ok(AuditEntry {
            id: row.try_get("id")?,
            timestamp: Self::parse_timestamp(&timestamp_raw)?,
            kind: AuditKind::try_from(kind_raw)?,
            description: row.try_get("description")?,
            hotline_id: row.try_get("hotline_id")?,
            user: row.try_get("user")?,
            metadata: row.try_get("metadata")?,
            reporter_number: row.try_get("reporter_number")?,
        })
    }

    fn row_to_blocked(row: SqliteRow) -> Result<BlockedNumber, HotlineError> {
        let timestamp_raw: String = row.try_get("timestamp")?;
        Ok(BlockedNumber {
            id: row.try_get("id")?,
            timestamp: Self::parse_timestamp(&timestamp_raw)?,
            hotline_id: row.try_get("hotline_id")?,
            number: row.try_get("number")?,
            blocked_by: row.try_get("blocked_by")?,
        })
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, HotlineError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HotlineError::MalformedColumn {
                column: "timestamp",
                reason: e.to_string(),
            })
    }

    fn classify_unique(err: sqlx::Error, slug: &str) -> HotlineError {
        if let Some(db_err) = err.as_database_error()
            && db_err.kind() == sqlx::error::ErrorKind::UniqueViolation
        {
            return HotlineError::DuplicateSlug(slug.to_string());
        }
        HotlineError::Database(err)
    }
}
