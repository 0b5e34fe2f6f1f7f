//! Auth bridge
//!
//! Passwordless email sign-in: magic-link requests, redirect completion
//! and session tracking on top of a pluggable [`AuthBridge`].

pub mod bridge;
pub mod callback;
pub mod error;
pub mod sign_in;
pub mod storage;
pub mod supabase;

#[cfg(test)]
mod testing;

pub use bridge::{AuthBridge, SessionListener, SessionSubscription};
pub use callback::{complete_sign_in, current_identity, CallbackOutcome, CompletionMethod, RedirectParams};
pub use error::{AuthError, AuthResult};
pub use sign_in::{request_magic_link, LINK_SENT_MESSAGE};
pub use storage::{AuthStorage, FileStorage, MemoryStorage};
pub use supabase::SupabaseAuthClient;
