//! Shared application state handed to every HTTP handler.

use std::sync::Mutex;

use crate::config::Config;
use crate::db::Db;

pub struct AppState {
    /// Single SQLite connection behind a mutex; handlers take it for the
    /// duration of one request.
    pub db: Mutex<Db>,
    pub config: Config,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        AppState {
            db: Mutex::new(db),
            config,
        }
    }
}
