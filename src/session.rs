/// Persisted session state.
///
/// The token and user record returned by `/login` are stored as JSON in the
/// platform config directory:
/// - Linux: ~/.config/lms-desk/session.json
/// - macOS: ~/Library/Application Support/lms-desk/session.json
/// - Windows: %APPDATA%\lms-desk\session.json
///
/// The session is an explicit value owned by the application and handed to
/// the API client; nothing else reads this file after startup.
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::types::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    fn file_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("lms-desk");
        path.push("session.json");
        path
    }

    /// Load the persisted session, if any. A file that no longer parses is
    /// treated as absent so the user just signs in again.
    pub fn load() -> Option<Session> {
        let raw = fs::read_to_string(Self::file_path()).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                log::warn!("discarding unreadable session file: {err}");
                None
            }
        }
    }

    pub fn save(&self) {
        let path = Self::file_path();
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!("could not create session directory: {err}");
                return;
            }
        }
        match serde_json::to_string(self) {
            Ok(raw) => {
                if let Err(err) = fs::write(&path, raw) {
                    log::warn!("could not write session file: {err}");
                }
            }
            Err(err) => log::warn!("could not serialize session: {err}"),
        }
    }

    pub fn clear() {
        let path = Self::file_path();
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("could not remove session file: {err}");
            }
        }
    }
}
