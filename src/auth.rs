use crate::{
    errors::{StoreError, ValidationError},
    models::{AccessState, PageId},
    storage::StoreState,
};
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

/// The one code that opens the card: the birthday, day then month (29 December).
pub const ACCEPTED_CODE: &str = "2912";

/// Store key holding the accepted code once the gate has been passed.
pub const ACCESS_KEY: &str = "card.accepted_code";

/// ValidatedCode
///
/// Proof that an input passed [`validate`]. Only this module can build one, so
/// [`AccessGate::accept`] cannot be reached with an unchecked string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCode(String);

impl ValidatedCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// validate
///
/// Pure check of a code entry. Exactly four ASCII digits, equal to
/// [`ACCEPTED_CODE`]. Persisting the result is the caller's job.
pub fn validate(input: &str) -> Result<ValidatedCode, ValidationError> {
    if input.len() != 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Format);
    }

    if input != ACCEPTED_CODE {
        return Err(ValidationError::Mismatch);
    }

    Ok(ValidatedCode(input.to_string()))
}

/// can_navigate_to
///
/// The navigation policy. `home` and `gate` are always reachable, every other
/// page only once the code has been accepted. Total over `PageId`; unknown
/// fragments are coerced to `home` before this is called.
pub fn can_navigate_to(target: PageId, state: &AccessState) -> bool {
    target.is_open() || state.accepted()
}

/// AccessGate
///
/// Owner of the card's `AccessState`. Constructed once at startup from the
/// persisted flag and shared by reference with the router (which reads it) and
/// the action handlers (which mutate it through `accept` and `reset`).
///
/// Mutations are serialized: the in-memory flip and the store write of one call
/// complete before the next call starts, so memory and the persisted flag never
/// disagree once both have returned.
pub struct AccessGate {
    state: RwLock<AccessState>,
    store: StoreState,
    mutation: Mutex<()>,
}

impl AccessGate {
    /// load
    ///
    /// Initializes the state from the store: key present means accepted. A stored
    /// value that no longer validates is ignored so a tampered or stale file
    /// cannot unlock the card.
    pub async fn load(store: StoreState) -> Result<Self, StoreError> {
        let state = match store.get(ACCESS_KEY).await? {
            Some(saved) => match validate(&saved) {
                Ok(code) => AccessState::unlocked(code.0),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring saved access flag that does not validate");
                    AccessState::locked()
                }
            },
            None => AccessState::locked(),
        };

        tracing::info!(accepted = state.accepted(), "Access state loaded from store");

        Ok(Self {
            state: RwLock::new(state),
            store,
            mutation: Mutex::new(()),
        })
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AccessState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_accepted(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .accepted()
    }

    /// Policy check against the current state.
    pub fn can_navigate_to(&self, target: PageId) -> bool {
        can_navigate_to(target, &self.snapshot())
    }

    /// accept
    ///
    /// Flips the state to accepted and persists the code. Calling it again with the
    /// same code leaves the state unchanged. The in-memory flip happens first: if
    /// persisting fails the error is returned for logging, and the card stays
    /// unlocked for the rest of this session only.
    pub async fn accept(&self, code: ValidatedCode) -> Result<(), StoreError> {
        let _mutation = self.mutation.lock().await;
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = AccessState::unlocked(code.as_str());
        }

        self.store.set(ACCESS_KEY, code.as_str()).await?;
        tracing::info!("Access code accepted and saved");
        Ok(())
    }

    /// reset
    ///
    /// Clears the state and the persisted flag. The in-memory state is cleared even
    /// when the store fails, so gated pages are denied again immediately.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _mutation = self.mutation.lock().await;
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = AccessState::locked();
        }

        self.store.remove(ACCESS_KEY).await?;
        tracing::info!("Access state reset");
        Ok(())
    }
}
