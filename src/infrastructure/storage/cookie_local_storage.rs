//! Browser-side local storage carried through HTTP cookies.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::repositories::{LocalStorage, StorageError};

/// Per-cookie size limit enforced by browsers (name, value and attributes).
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Attributes applied to every storage cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Adds the `Secure` attribute. Enable when served over HTTPS.
    pub secure: bool,
    pub max_age_seconds: u64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            // Browsers cap cookie lifetime at 400 days.
            max_age_seconds: 400 * 24 * 60 * 60,
        }
    }
}

/// Request-scoped view of the browser's storage.
///
/// Reads come from the request `Cookie` header; writes are collected and
/// emitted as `Set-Cookie` headers on the response. Values are base64url
/// encoded so JSON survives cookie syntax.
///
/// # Cookie Format
///
/// ```text
/// Set-Cookie: user=eyJpZCI6InUxIn0; Path=/; Max-Age=34560000; SameSite=Lax
/// ```
pub struct CookieLocalStorage {
    settings: CookieSettings,
    incoming: HashMap<String, String>,
    writes: Mutex<Vec<(String, String)>>,
}

impl CookieLocalStorage {
    /// Creates an empty storage with no incoming cookies.
    pub fn new(settings: CookieSettings) -> Self {
        Self {
            settings,
            incoming: HashMap::new(),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Creates a storage pre-loaded with the request's cookies.
    ///
    /// Cookies whose values are not valid encoded strings are ignored.
    pub fn from_headers(settings: CookieSettings, headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|cookie_str| cookie_str.split(';'))
            .filter_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(name), Some(value)) if !name.is_empty() => {
                        decode(value).map(|decoded| (name.to_string(), decoded))
                    }
                    _ => None,
                }
            })
            .collect();

        Self {
            settings,
            incoming,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Returns one `Set-Cookie` header value per written entry.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let writes = match self.writes.lock() {
            Ok(writes) => writes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        writes
            .iter()
            .map(|(key, value)| self.build_cookie(key, value))
            .collect()
    }

    fn build_cookie(&self, key: &str, value: &str) -> String {
        let secure = if self.settings.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax{}",
            key,
            URL_SAFE_NO_PAD.encode(value),
            self.settings.max_age_seconds,
            secure
        )
    }
}

fn decode(value: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(value.trim_matches('"')).ok()?;
    String::from_utf8(bytes).ok()
}

impl LocalStorage for CookieLocalStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let cookie = self.build_cookie(key, value);
        if cookie.len() > MAX_COOKIE_BYTES {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: cookie.len(),
                limit: MAX_COOKIE_BYTES,
            });
        }

        let mut writes = self
            .writes
            .lock()
            .map_err(|_| StorageError::Unavailable("cookie jar lock poisoned".to_string()))?;

        match writes.iter_mut().find(|(existing, _)| existing == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => writes.push((key.to_string(), value.to_string())),
        }

        Ok(())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        let written = self.writes.lock().ok().and_then(|writes| {
            writes
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value.clone())
        });

        written.or_else(|| self.incoming.get(key).cloned())
    }
}
