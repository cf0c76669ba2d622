//! Client-side principal cache
//!
//! The cache is a hint: it lets a page render before the server answers, but
//! the session service stays authoritative. Only [`crate::SyncClient`] writes
//! the principal; readers take immutable snapshots or subscribe to changes.
//!
//! ```ignore
//! let mut changes = client.cache().subscribe();
//! while changes.changed().await.is_ok() {
//!     let snapshot = changes.borrow_and_update().clone();
//!     render(snapshot.landing_state());
//! }
//! ```

use std::sync::Arc;

use portal_auth_core::{LandingState, SessionView};
use portal_types::{Principal, ProfileCompleteness, ProfileFields};
use tokio::sync::watch;

/// Lifecycle phase of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    /// Waiting for the first pull from the server
    Loading,
    /// Holding the latest known state
    Ready,
}

/// Immutable view of the cache at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub principal: Option<Principal>,
    pub profile: Option<ProfileFields>,
    /// Incremented on every write
    pub generation: u64,
    pub phase: CachePhase,
}

impl CacheSnapshot {
    fn anonymous(generation: u64) -> Self {
        Self {
            principal: None,
            profile: None,
            generation,
            phase: CachePhase::Ready,
        }
    }

    /// Replace the principal; profile data belongs to one user and is
    /// dropped when the identity changes.
    fn adopt(&mut self, principal: Option<Principal>) {
        let same_user = match (&self.principal, &principal) {
            (Some(current), Some(incoming)) => current.id == incoming.id,
            _ => false,
        };
        if !same_user {
            self.profile = None;
        }
        self.principal = principal;
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_valid)
    }

    pub fn profile_completeness(&self) -> ProfileCompleteness {
        ProfileCompleteness::of(self.profile.as_ref())
    }

    pub fn session_view(&self) -> SessionView<'_> {
        match (self.phase, &self.principal) {
            (CachePhase::Loading, _) => SessionView::Loading,
            (CachePhase::Ready, Some(principal)) => SessionView::Authenticated(principal),
            (CachePhase::Ready, None) => SessionView::Anonymous,
        }
    }

    /// Where this snapshot would land the page
    pub fn landing_state(&self) -> LandingState {
        LandingState::derive(self.session_view(), self.profile_completeness())
    }
}

/// Owned principal cache with a single writer.
#[derive(Debug)]
pub struct PrincipalCache {
    tx: watch::Sender<Arc<CacheSnapshot>>,
}

impl Default for PrincipalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PrincipalCache {
    /// New cache in the `Loading` phase
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(CacheSnapshot {
            phase: CachePhase::Loading,
            ..CacheSnapshot::anonymous(0)
        }));
        Self { tx }
    }

    /// Current state
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.tx.borrow().clone()
    }

    /// Receive every subsequent snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheSnapshot>> {
        self.tx.subscribe()
    }

    /// Attach client-side profile data; `None` marks it as not loaded
    pub fn set_profile(&self, profile: Option<ProfileFields>) {
        self.write(|next| next.profile = profile);
    }

    /// Return to `Loading`, keeping the cached principal as a hint
    pub fn init(&self) {
        self.write(|next| next.phase = CachePhase::Loading);
    }

    /// Drop everything and become anonymous
    pub fn teardown(&self) {
        self.write(|next| *next = CacheSnapshot::anonymous(next.generation));
    }

    pub(crate) fn login(&self, principal: Principal) {
        self.write(|next| {
            next.adopt(Some(principal));
            next.phase = CachePhase::Ready;
        });
    }

    pub(crate) fn logout(&self) {
        self.write(|next| *next = CacheSnapshot::anonymous(next.generation));
    }

    /// Apply the server's answer to a validation pull
    pub(crate) fn apply_pull(&self, principal: Option<Principal>) {
        self.write(|next| {
            next.adopt(principal);
            next.phase = CachePhase::Ready;
        });
    }

    /// Leave `Loading` without changing the principal
    pub(crate) fn settle(&self) {
        if self.tx.borrow().phase == CachePhase::Ready {
            return;
        }
        self.write(|next| next.phase = CachePhase::Ready);
    }

    fn write(&self, update: impl FnOnce(&mut CacheSnapshot)) {
        self.tx.send_modify(|current| {
            let mut next = (**current).clone();
            update(&mut next);
            next.generation = current.generation + 1;
            *current = Arc::new(next);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_auth_core::LandingTarget;
    use portal_types::RoleTag;

    fn consumer() -> Principal {
        Principal::new("u1", "a@b.com", RoleTag::Consumer)
    }

    fn full_profile() -> ProfileFields {
        ProfileFields {
            age: Some("34".into()),
            weight: Some("70".into()),
            height: Some("175".into()),
            gender: Some("female".into()),
        }
    }

    #[test]
    fn test_starts_loading() {
        let cache = PrincipalCache::new();
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.phase, CachePhase::Loading);
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.landing_state(), LandingState::Loading);
    }

    #[test]
    fn test_generation_increments_per_write() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        cache.set_profile(Some(full_profile()));
        cache.logout();
        assert_eq!(cache.snapshot().generation, 3);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        let before = cache.snapshot();
        cache.logout();
        assert!(before.is_authenticated());
        assert!(!cache.snapshot().is_authenticated());
    }

    #[test]
    fn test_consumer_landing_follows_profile() {
        let cache = PrincipalCache::new();
        cache.apply_pull(Some(consumer()));
        assert_eq!(cache.snapshot().landing_state(), LandingState::Resolving);

        cache.set_profile(Some(full_profile()));
        assert_eq!(
            cache.snapshot().landing_state(),
            LandingState::Resolved(LandingTarget::ConsumerHome)
        );
    }

    #[test]
    fn test_absent_pull_clears_profile() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        cache.set_profile(Some(full_profile()));
        cache.apply_pull(None);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.principal, None);
        assert_eq!(snapshot.profile, None);
        assert_eq!(snapshot.landing_state(), LandingState::Unauthenticated);
    }

    #[test]
    fn test_profile_dropped_when_user_changes() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        cache.set_profile(Some(full_profile()));

        let other = Principal::new("u9", "z@y.com", RoleTag::Consumer);
        cache.apply_pull(Some(other.clone()));
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.principal, Some(other));
        assert_eq!(snapshot.profile, None);
        assert_eq!(snapshot.landing_state(), LandingState::Resolving);

        cache.set_profile(Some(full_profile()));
        cache.login(consumer());
        assert_eq!(cache.snapshot().profile, None);
    }

    #[test]
    fn test_profile_kept_for_same_user() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        cache.set_profile(Some(full_profile()));
        cache.apply_pull(Some(consumer().with_display_name("Ana")));

        assert_eq!(cache.snapshot().profile, Some(full_profile()));
        assert_eq!(
            cache.snapshot().landing_state(),
            LandingState::Resolved(LandingTarget::ConsumerHome)
        );
    }

    #[test]
    fn test_init_and_teardown() {
        let cache = PrincipalCache::new();
        cache.login(consumer());
        cache.init();
        assert_eq!(cache.snapshot().phase, CachePhase::Loading);
        assert!(cache.snapshot().principal.is_some());

        cache.teardown();
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.phase, CachePhase::Ready);
        assert_eq!(snapshot.principal, None);
    }

    #[test]
    fn test_settle_only_from_loading() {
        let cache = PrincipalCache::new();
        cache.settle();
        assert_eq!(cache.snapshot().generation, 1);
        cache.settle();
        assert_eq!(cache.snapshot().generation, 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let cache = PrincipalCache::new();
        let mut rx = cache.subscribe();

        cache.login(consumer());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().principal, Some(consumer()));
    }
}
