use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use slideshow_engine::render::RenderJobSpec;

use crate::db::Database;

pub mod processor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(anyhow!("unknown job status {:?}", other)),
        }
    }
}

/// One render request and what became of it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: i64,
    pub project_id: String,
    pub quality: String,
    pub status: JobStatus,
    pub artifact_locator: Option<String>,
    pub error: Option<String>,
    pub engine_logs: Option<Value>,
    /// The job exactly as it was submitted.
    pub spec: RenderJobSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct JobManager {
    db: Arc<Database>,
}

impl JobManager {
    pub fn new(db: Arc<Database>) -> Self {
        JobManager { db }
    }

    pub fn create_job(&self, project_id: &str, quality: &str, spec: &RenderJobSpec) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let spec_json = serde_json::to_string(spec)?;

        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO render_jobs (project_id, quality, status, spec_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![project_id, quality, JobStatus::Pending.as_str(), spec_json, now, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_job(&self, id: i64) -> Result<Option<RenderJob>> {
        let conn = self.db.conn()?;
        let raw = conn
            .query_row(
                "SELECT id, project_id, quality, status, artifact_locator, error, engine_logs_json, spec_json, created_at, updated_at
                 FROM render_jobs WHERE id = ?1",
                params![id],
                RawJob::from_row,
            )
            .optional()?;

        raw.map(RawJob::into_job).transpose()
    }

    pub fn mark_running(&self, id: i64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.conn()?;
        let updated = conn.execute(
            "UPDATE render_jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![JobStatus::Running.as_str(), now, id],
        )?;
        if updated == 0 {
            return Err(anyhow!("render job {} not found", id));
        }
        Ok(())
    }

    pub fn mark_completed(&self, id: i64, artifact_locator: &str, logs: &Value) -> Result<()> {
        self.finish(id, JobStatus::Completed, Some(artifact_locator), None, logs)
    }

    pub fn mark_failed(&self, id: i64, error: &str, logs: Option<&Value>) -> Result<()> {
        self.finish(id, JobStatus::Failed, None, Some(error), logs.unwrap_or(&Value::Null))
    }

    fn finish(
        &self,
        id: i64,
        status: JobStatus,
        artifact_locator: Option<&str>,
        error: Option<&str>,
        logs: &Value,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let logs_json = if logs.is_null() {
            None
        } else {
            Some(serde_json::to_string(logs)?)
        };

        let conn = self.db.conn()?;
        let updated = conn.execute(
            "UPDATE render_jobs
             SET status = ?1, artifact_locator = ?2, error = ?3, engine_logs_json = ?4, updated_at = ?5
             WHERE id = ?6",
            params![status.as_str(), artifact_locator, error, logs_json, now, id],
        )?;
        if updated == 0 {
            return Err(anyhow!("render job {} not found", id));
        }
        Ok(())
    }
}

struct RawJob {
    id: i64,
    project_id: String,
    quality: String,
    status: String,
    artifact_locator: Option<String>,
    error: Option<String>,
    engine_logs_json: Option<String>,
    spec_json: String,
    created_at: String,
    updated_at: String,
}

impl RawJob {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawJob {
            id: row.get(0)?,
            project_id: row.get(1)?,
            quality: row.get(2)?,
            status: row.get(3)?,
            artifact_locator: row.get(4)?,
            error: row.get(5)?,
            engine_logs_json: row.get(6)?,
            spec_json: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_job(self) -> Result<RenderJob> {
        Ok(RenderJob {
            id: self.id,
            project_id: self.project_id,
            quality: self.quality,
            status: self.status.parse()?,
            artifact_locator: self.artifact_locator,
            error: self.error,
            engine_logs: self
                .engine_logs_json
                .map(|s| serde_json::from_str(&s))
                .transpose()?,
            spec: serde_json::from_str(&self.spec_json)?,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)?.with_timezone(&Utc),
        })
    }
}
