//! Persisted session store.
//!
//! [`SessionStore`] is the single owner of the [`Session`]. It is shared as
//! an `Arc<SessionStore>` between the HTTP client (which reads tokens and
//! performs the refresh/logout transitions) and the view layer (which reads
//! the authenticated flag and the user).

use super::{
    claims::decode_claims,
    errors::{AuthError, AuthResult},
    models::{AuthTokens, Session, TokenPair, User},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// Fixed key the session is persisted under.
pub const STORAGE_KEY: &str = "auth-storage";

/// Durable key-value slot holding the serialized session.
pub trait SessionStorage: Send + Sync {
    /// Load the serialized session, `None` if nothing was stored yet.
    fn load(&self) -> AuthResult<Option<String>>;

    /// Replace the serialized session.
    fn save(&self, contents: &str) -> AuthResult<()>;
}

/// Stores the session as `<dir>/auth-storage.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> AuthResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    fn save(&self, contents: &str) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves half a session behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory storage, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Start with pre-existing serialized contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// The last contents written.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> AuthResult<Option<String>> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> AuthResult<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }
}

/// Session store
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Open the store, restoring whatever session `storage` holds.
    ///
    /// Unreadable, corrupt or inconsistent state is discarded (and logged)
    /// rather than failing startup; the user simply has to log in again.
    pub fn open(storage: Box<dyn SessionStorage>) -> Self {
        let session = match storage.load() {
            Ok(Some(contents)) => match serde_json::from_str::<Session>(&contents) {
                Ok(session) if session.is_consistent() => session,
                Ok(_) => {
                    log::warn!("Discarding inconsistent persisted session");
                    Session::default()
                }
                Err(e) => {
                    log::warn!("Discarding corrupt persisted session: {}", e);
                    Session::default()
                }
            },
            Ok(None) => Session::default(),
            Err(e) => {
                log::warn!("Failed to load persisted session: {}", e);
                Session::default()
            }
        };

        if session.is_authenticated {
            log::info!("Restored persisted session");
        }

        Self {
            state: RwLock::new(session),
            storage,
        }
    }

    /// Transition to the authenticated state.
    ///
    /// The user comes from the response payload when the backend sends one,
    /// otherwise from the access token's claims.
    ///
    /// # Errors
    ///
    /// * `AuthError::MalformedToken` - No user payload and the access token
    ///   can't be decoded; the session is left untouched
    pub fn login(&self, tokens: AuthTokens) -> AuthResult<User> {
        let user = match tokens.user.clone() {
            Some(user) => user,
            None => decode_claims(&tokens.access)?.into(),
        };

        let session = Session::authenticated(tokens.pair(), user.clone());
        self.replace(session);
        log::info!("Session started for {}", user.username);
        Ok(user)
    }

    /// Clear every session field.
    pub fn logout(&self) {
        self.replace(Session::default());
        log::info!("Session cleared");
    }

    /// Replace the token pair after a refresh, leaving `user` untouched.
    pub fn set_tokens(&self, tokens: TokenPair) {
        let snapshot = {
            let mut state = self.write();
            state.access_token = Some(tokens.access);
            state.refresh_token = Some(tokens.refresh);
            state.clone()
        };
        self.persist(&snapshot);
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    fn replace(&self, session: Session) {
        *self.write() = session.clone();
        self.persist(&session);
    }

    fn persist(&self, session: &Session) {
        let result = serde_json::to_string(session)
            .map_err(AuthError::from)
            .and_then(|contents| self.storage.save(&contents));
        if let Err(e) = result {
            log::warn!("Failed to persist session: {}", e);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
