//! Analysis result storage

use rusqlite::params;
use serde::Serialize;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{AnalysisKind, StoredAnalysis};

/// Row counts for status output
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub linked_users: i64,
    pub total_analyses: i64,
}

impl Database {
    /// Persist one analysis run
    pub fn insert_analysis(
        &self,
        user_id: i64,
        kind: AnalysisKind,
        data: &serde_json::Value,
        insight: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let data_json = serde_json::to_string(data)?;

        conn.execute(
            "INSERT INTO analysis_results (user_id, kind, data, insight) VALUES (?, ?, ?, ?)",
            params![user_id, kind.as_str(), data_json, insight],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List a user's stored analyses, newest first
    pub fn list_analyses(
        &self,
        user_id: i64,
        kind: Option<AnalysisKind>,
        limit: i64,
    ) -> Result<Vec<StoredAnalysis>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, kind, data, insight, created_at
            FROM analysis_results
            WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id, kind.map(|k| k.as_str()), limit], |row| {
                let kind_str: String = row.get(2)?;
                let data_str: String = row.get(3)?;
                let created_at_str: String = row.get(5)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    kind_str,
                    data_str,
                    row.get::<_, Option<String>>(4)?,
                    created_at_str,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut analyses = Vec::with_capacity(rows.len());
        for (id, user_id, kind_str, data_str, insight, created_at_str) in rows {
            let kind = match kind_str.parse::<AnalysisKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!(id, error = %e, "Skipping analysis with unknown kind");
                    continue;
                }
            };
            analyses.push(StoredAnalysis {
                id,
                user_id,
                kind,
                data: serde_json::from_str(&data_str)?,
                insight,
                created_at: parse_datetime(&created_at_str),
            });
        }

        Ok(analyses)
    }

    /// Counts for the status command
    pub fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        let conn = self.conn()?;

        let total_users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let linked_users: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE tripletex_token IS NOT NULL AND tripletex_token != ''",
            [],
            |row| row.get(0),
        )?;
        let total_analyses: i64 =
            conn.query_row("SELECT COUNT(*) FROM analysis_results", [], |row| row.get(0))?;

        Ok(DashboardStats {
            total_users,
            linked_users,
            total_analyses,
        })
    }
}
