//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock whose reading only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod photos {
    //! In-memory photo store that records traffic and can be told to fail.

    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::domain::ports::{PhotoSource, PhotoUploadError, PhotoUploader};
    use crate::domain::{PhotoUpload, StoredPhoto};

    #[derive(Default)]
    struct Inner {
        attempts: usize,
        stored: BTreeMap<String, StoredPhoto>,
        removed: Vec<String>,
    }

    /// Photo store keeping uploads in a map keyed by file name.
    ///
    /// `fail_on(n)` makes the n-th upload attempt (1-based) fail with a
    /// storage error while earlier and later attempts succeed.
    #[derive(Default)]
    pub struct RecordingPhotoStore {
        inner: Mutex<Inner>,
        fail_on: Option<usize>,
    }

    impl RecordingPhotoStore {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn fail_on(mut self, attempt: usize) -> Self {
            self.fail_on = Some(attempt);
            self
        }

        /// File names currently stored.
        pub fn stored_names(&self) -> Vec<String> {
            self.lock().stored.keys().cloned().collect()
        }

        /// URLs passed to `remove`, in call order.
        pub fn removed_urls(&self) -> Vec<String> {
            self.lock().removed.clone()
        }

        fn lock(&self) -> MutexGuard<'_, Inner> {
            match self.inner.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("photo store mutex"),
            }
        }
    }

    #[async_trait]
    impl PhotoUploader for RecordingPhotoStore {
        async fn upload(
            &self,
            photo: &PhotoUpload,
            base_url: &str,
        ) -> Result<String, PhotoUploadError> {
            let mut inner = self.lock();
            inner.attempts += 1;
            if self.fail_on == Some(inner.attempts) {
                return Err(PhotoUploadError::storage("injected failure"));
            }
            let name = format!("{}.{}", Uuid::new_v4().simple(), photo.extension());
            let content_type = photo
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_owned());
            inner.stored.insert(
                name.clone(),
                StoredPhoto {
                    content_type,
                    bytes: photo.bytes.clone(),
                },
            );
            Ok(format!("{base_url}/uploads/{name}"))
        }

        async fn remove(&self, url: &str) -> Result<(), PhotoUploadError> {
            let mut inner = self.lock();
            inner.removed.push(url.to_owned());
            if let Some((_, name)) = url.rsplit_once('/') {
                inner.stored.remove(name);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PhotoSource for RecordingPhotoStore {
        async fn fetch(&self, file_name: &str) -> Result<Option<StoredPhoto>, PhotoUploadError> {
            Ok(self.lock().stored.get(file_name).cloned())
        }
    }
}

pub mod app {
    //! Fully wired HTTP state over the in-memory adapters.

    use std::sync::Arc;

    use actix_web::web;
    use mockable::DefaultClock;

    use crate::domain::ReportSubmissionService;
    use crate::inbound::http::cookie_config::CookieSettings;
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::outbound::memory::{InMemoryDisasterReportRepository, InMemoryUserRepository};
    use crate::outbound::security::PasswordHashing;

    use super::photos::RecordingPhotoStore;

    /// Base URL prefixed to photo URLs issued by test backends.
    pub const TEST_BASE_URL: &str = "http://resqlink.test";

    /// Handles kept by a test after building the HTTP state.
    pub struct TestBackend {
        pub state: web::Data<HttpState>,
        pub reports: Arc<InMemoryDisasterReportRepository>,
        pub photos: Arc<RecordingPhotoStore>,
    }

    impl TestBackend {
        pub fn new() -> Self {
            Self::with_photos(RecordingPhotoStore::new())
        }

        pub fn with_photos(photos: RecordingPhotoStore) -> Self {
            let clock = Arc::new(DefaultClock);
            let users = Arc::new(InMemoryUserRepository::new(
                PasswordHashing::low_cost(),
                clock.clone(),
            ));
            let reports = Arc::new(InMemoryDisasterReportRepository::new(clock));
            let photos = Arc::new(photos);
            let submissions =
                ReportSubmissionService::new(reports.clone(), photos.clone(), TEST_BASE_URL);
            let ports = HttpStatePorts {
                users,
                reports: reports.clone(),
                submissions,
                photos: photos.clone(),
            };
            let cookies = CookieSettings {
                secure: false,
                ..CookieSettings::default()
            };
            Self {
                state: web::Data::new(HttpState::new(ports, cookies)),
                reports,
                photos,
            }
        }
    }

    impl Default for TestBackend {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            _ => panic!("schema '{name}' is not an Object"),
        }
    }

    /// Names of the properties an Object schema declares.
    pub fn property_names(obj: &Object) -> Vec<&str> {
        obj.properties.keys().map(String::as_str).collect()
    }
}
