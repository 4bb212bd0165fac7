//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next to
//! the repositories that read them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{disaster_reports, sessions, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: DateTime<Utc>,
    pub role: String,
    pub status_update_frequency: i32,
    pub is_location_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub birth_date: DateTime<Utc>,
    pub role: &'a str,
    pub status_update_frequency: i32,
    pub is_location_shared: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub user_id: Option<Uuid>,
    pub anonymous_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: &'a str,
    pub user_id: Option<Uuid>,
    pub anonymous_id: Option<&'a str>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = disaster_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DisasterReportRow {
    pub id: Uuid,
    pub reporter_id: Option<String>,
    pub name: String,
    pub status: String,
    pub raw_situation: String,
    pub photo_urls: Vec<String>,
    pub responder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = disaster_reports)]
pub(crate) struct NewDisasterReportRow<'a> {
    pub id: Uuid,
    pub reporter_id: Option<&'a str>,
    pub name: &'a str,
    pub status: &'a str,
    pub raw_situation: &'a str,
    pub photo_urls: &'a [String],
}
