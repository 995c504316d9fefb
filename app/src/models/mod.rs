// cartkeep_app/src/models/mod.rs

//! Records owned by the web application. Catalog and cart types live in `cartkeep`.

pub mod user;

pub use user::{NewUser, Role, User};
