//! Photo storage adapters.

mod local_photo_store;

pub use local_photo_store::{LocalPhotoStore, UPLOADS_ROUTE_PREFIX};
