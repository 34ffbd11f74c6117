use catacombs_schema::PlayerView;
use catacombs_stats::{derive_player_view, Comparison, ComparisonEntry, DeriveOptions, TrackerError, XpCurve};

use crate::source::{AvatarProvider, IdentityResolver, StatsSource};
use crate::tokens::{RequestToken, RequestTokens, Slot};

/// Fetch-and-derive pipeline: name -> id -> raw stats -> [`PlayerView`].
///
/// Holds no mutable state, so lookups for different slots can run
/// concurrently against one tracker.
#[derive(Debug, Clone)]
pub struct Tracker<R, S, A> {
    resolver: R,
    stats: S,
    avatars: A,
    xp_curve: XpCurve,
}

impl<R, S, A> Tracker<R, S, A> {
    pub fn new(resolver: R, stats: S, avatars: A) -> Self {
        Self {
            resolver,
            stats,
            avatars,
            xp_curve: XpCurve::default(),
        }
    }

    pub fn with_xp_curve(mut self, xp_curve: XpCurve) -> Self {
        self.xp_curve = xp_curve;
        self
    }
}

impl<R, S, A> Tracker<R, S, A>
where
    R: IdentityResolver,
    S: StatsSource,
    A: AvatarProvider,
{
    pub async fn lookup(&self, name: &str) -> Result<PlayerView, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::identity_not_found(name));
        }

        let player = self.resolver.resolve_identity(name).await?;
        tracing::debug!(player = %player.name, id = %player.id, "identity resolved");
        let payload = self.stats.fetch_raw_stats(&player).await?;

        let options = DeriveOptions {
            player_id: Some(player.id.clone()),
            xp_curve: self.xp_curve.clone(),
        };
        let view = derive_player_view(&player.name, self.avatars.avatar_url(&player.name), &payload, &options)?;
        tracing::info!(player = %view.display_name, profile = %view.profile_name, weight = view.weight, "derived player view");
        Ok(view)
    }

    /// Runs the lookup for a token from [`Dashboard::begin_lookup`] or
    /// [`Dashboard::begin_comparison`]. The dashboard is not borrowed while
    /// the fetch is in flight, so lookups for several tokens may overlap;
    /// hand each result to [`Dashboard::apply`].
    pub async fn run(&self, token: RequestToken, name: &str) -> Completed {
        let result = self.lookup(name).await;
        Completed { token, result }
    }
}

/// A finished lookup, tagged with the token it was started under.
#[derive(Debug)]
pub struct Completed {
    token: RequestToken,
    result: Result<PlayerView, TrackerError>,
}

impl Completed {
    pub fn token(&self) -> &RequestToken {
        &self.token
    }
}

/// Presentation state: the single-player view, its last error and the
/// comparison list. Results are applied only while their token is current.
#[derive(Debug, Default)]
pub struct Dashboard {
    tokens: RequestTokens,
    current: Option<PlayerView>,
    error: Option<TrackerError>,
    comparison: Comparison,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&PlayerView> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&TrackerError> {
        self.error.as_ref()
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn is_loading(&self) -> bool {
        self.tokens.is_pending(&Slot::Single)
    }

    pub fn begin_lookup(&mut self) -> RequestToken {
        self.error = None;
        self.tokens.issue(Slot::Single)
    }

    /// Returns whether the result was applied. A failed lookup keeps the
    /// previous view.
    pub fn finish_lookup(&mut self, token: RequestToken, result: Result<PlayerView, TrackerError>) -> bool {
        if !self.tokens.complete(&token) {
            tracing::debug!("discarding stale lookup result");
            return false;
        }
        match result {
            Ok(view) => self.current = Some(view),
            Err(err) => {
                tracing::warn!(error = %err, "lookup failed");
                self.error = Some(err);
            }
        }
        true
    }

    /// Rejects names already in the comparison before any fetch starts.
    pub fn begin_comparison(&mut self, name: &str) -> Result<RequestToken, TrackerError> {
        if self.comparison.contains(name) {
            return Err(TrackerError::duplicate_player(name));
        }
        Ok(self.tokens.issue(Slot::comparison(name)))
    }

    /// `Ok(false)` when the request was superseded or cancelled.
    pub fn finish_comparison(
        &mut self,
        token: RequestToken,
        result: Result<PlayerView, TrackerError>,
    ) -> Result<bool, TrackerError> {
        if !self.tokens.complete(&token) {
            tracing::debug!(slot = ?token.slot(), "discarding stale comparison result");
            return Ok(false);
        }
        self.comparison.add(ComparisonEntry::new(result?))?;
        Ok(true)
    }

    /// Routes a finished lookup to the slot its token was issued for.
    pub fn apply(&mut self, done: Completed) -> Result<bool, TrackerError> {
        let Completed { token, result } = done;
        match token.slot() {
            Slot::Single => Ok(self.finish_lookup(token, result)),
            Slot::Comparison(_) => self.finish_comparison(token, result),
        }
    }

    /// Also cancels an in-flight add for the same name.
    pub fn remove_from_comparison(&mut self, name: &str) -> &[ComparisonEntry] {
        self.tokens.cancel(&Slot::comparison(name));
        self.comparison.remove(name)
    }
}
