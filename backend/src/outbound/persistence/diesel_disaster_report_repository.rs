//! PostgreSQL-backed `DisasterReportRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DisasterReportRepository, DisasterReportRepositoryError};
use crate::domain::{
    CitizenStatus, DisasterReport, NewDisasterReport, ReporterId, ResponderAssignment,
    SetResponder, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DisasterReportRow, NewDisasterReportRow};
use super::pool::{DbPool, PoolError};
use super::schema::disaster_reports;

/// Diesel-backed implementation of the `DisasterReportRepository` port.
///
/// Lists are ordered newest first, ties broken by id so pagination-free
/// listings stay stable.
#[derive(Clone)]
pub struct DieselDisasterReportRepository {
    pool: DbPool,
}

impl DieselDisasterReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> DisasterReportRepositoryError {
    map_pool_error(error, DisasterReportRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> DisasterReportRepositoryError {
    map_diesel_error(
        error,
        DisasterReportRepositoryError::query,
        DisasterReportRepositoryError::connection,
    )
}

fn row_to_report(row: DisasterReportRow) -> Result<DisasterReport, DisasterReportRepositoryError> {
    let reporter_id = row
        .reporter_id
        .map(ReporterId::new)
        .transpose()
        .map_err(|err| DisasterReportRepositoryError::query(format!("stored reporter id: {err}")))?;
    let status = row
        .status
        .parse::<CitizenStatus>()
        .map_err(|err| DisasterReportRepositoryError::query(format!("stored status: {err}")))?;
    Ok(DisasterReport {
        id: row.id,
        reporter_id,
        name: row.name,
        status,
        raw_situation: row.raw_situation,
        photo_urls: row.photo_urls,
        responder_id: row.responder_id.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_reports(
    rows: Vec<DisasterReportRow>,
) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError> {
    rows.into_iter().map(row_to_report).collect()
}

#[async_trait]
impl DisasterReportRepository for DieselDisasterReportRepository {
    async fn list_by_reporter(
        &self,
        reporter_id: &ReporterId,
    ) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<DisasterReportRow> = disaster_reports::table
            .filter(disaster_reports::reporter_id.eq(reporter_id.as_str()))
            .order_by((
                disaster_reports::created_at.desc(),
                disaster_reports::id.desc(),
            ))
            .select(DisasterReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_reports(rows)
    }

    async fn list(&self) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<DisasterReportRow> = disaster_reports::table
            .order_by((
                disaster_reports::created_at.desc(),
                disaster_reports::id.desc(),
            ))
            .select(DisasterReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_reports(rows)
    }

    async fn create(
        &self,
        report: &NewDisasterReport,
    ) -> Result<DisasterReport, DisasterReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewDisasterReportRow {
            id: Uuid::new_v4(),
            reporter_id: report.reporter_id.as_ref().map(ReporterId::as_str),
            name: &report.name,
            status: report.status.as_str(),
            raw_situation: &report.raw_situation,
            photo_urls: &report.photo_urls,
        };
        let created: DisasterReportRow = diesel::insert_into(disaster_reports::table)
            .values(&row)
            .returning(DisasterReportRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_report(created)
    }

    async fn set_responder(
        &self,
        assignment: &SetResponder,
    ) -> Result<ResponderAssignment, DisasterReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(
            disaster_reports::table
                .filter(disaster_reports::reporter_id.eq(assignment.reporter_id.as_str())),
        )
        .set((
            disaster_reports::responder_id.eq(Some(*assignment.responder_id.as_uuid())),
            disaster_reports::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        if updated == 0 {
            return Err(DisasterReportRepositoryError::not_found(
                assignment.reporter_id.as_str(),
            ));
        }
        Ok(ResponderAssignment {
            reporter_id: assignment.reporter_id.clone(),
            responder_id: assignment.responder_id,
            updated_reports: updated as u64,
        })
    }
}
