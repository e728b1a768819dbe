// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sign-in state as an explicit capability.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// An external authentication service.
///
/// Implementations wrap whatever sign-in flow the application uses. Store
/// access control is enforced by the store itself, not by this trait.
pub trait IdentityProvider: Send + Sync {
    /// Returns `true` while a user is signed in.
    fn is_signed_in(&self) -> bool;

    /// Signs the current user out.
    fn sign_out(&self);
}

/// In-process identity, for embedding and tests.
///
/// # Examples
///
/// ```
/// use relaysync_lib::session::{IdentityProvider, LocalIdentity};
///
/// let identity = LocalIdentity::signed_in();
/// assert!(identity.is_signed_in());
/// identity.sign_out();
/// assert!(!identity.is_signed_in());
/// ```
#[derive(Debug, Default)]
pub struct LocalIdentity {
    signed_in: AtomicBool,
}

impl LocalIdentity {
    /// Creates an identity with a user signed in.
    #[must_use]
    pub fn signed_in() -> Self {
        Self {
            signed_in: AtomicBool::new(true),
        }
    }

    /// Creates an identity with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Marks a user as signed in.
    pub fn sign_in(&self) {
        self.signed_in.store(true, Ordering::SeqCst);
    }
}

impl IdentityProvider for LocalIdentity {
    fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn sign_out(&self) {
        self.signed_in.store(false, Ordering::SeqCst);
    }
}

impl<P: IdentityProvider + ?Sized> IdentityProvider for Arc<P> {
    fn is_signed_in(&self) -> bool {
        (**self).is_signed_in()
    }

    fn sign_out(&self) {
        (**self).sign_out();
    }
}

/// Shared handle to the identity provider.
///
/// Cloning is cheap; all clones talk to the same provider.
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn IdentityProvider>,
}

impl Session {
    /// Wraps a provider.
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Returns `true` while a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.provider.is_signed_in()
    }

    /// Signs the current user out through the provider.
    pub fn sign_out(&self) {
        tracing::info!("Signing out");
        self.provider.sign_out();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}
