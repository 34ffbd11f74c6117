use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedPayload,
    NoProfilesFound,
    IdentityNotFound,
    RateLimited,
    UpstreamServiceError,
    Timeout,
    DuplicatePlayer,
}

impl ErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Payload
            "E1001" | "E1002" => Self::MalformedPayload,
            "E1101" => Self::NoProfilesFound,

            // Upstream
            "E2001" => Self::IdentityNotFound,
            "E2002" => Self::RateLimited,
            "E2003" | "E2004" => Self::UpstreamServiceError,
            "E2005" => Self::Timeout,

            // Comparison
            "E3001" => Self::DuplicatePlayer,

            _ => Self::UpstreamServiceError,
        }
    }

    /// Short message suitable for showing to a user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::MalformedPayload => "The stats service returned data in an unexpected format",
            Self::NoProfilesFound => "No profiles found for this player",
            Self::IdentityNotFound => "Player not found",
            Self::RateLimited => "Too many requests, try again shortly",
            Self::UpstreamServiceError => "The stats service is unavailable",
            Self::Timeout => "The request timed out",
            Self::DuplicatePlayer => "Player is already in the comparison",
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct TrackerError {
    pub code: &'static str,
    pub kind: ErrorKind,
    pub message: String,

    pub player: Option<String>,
    pub status: Option<u16>,
    pub context: Option<String>,
}

impl TrackerError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: ErrorKind::from_code(code),
            message: message.into(),

            player: None,
            status: None,
            context: None,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new("E1001", message)
    }

    pub fn no_profiles() -> Self {
        Self::new("E1101", "no profiles found for this player")
    }

    pub fn identity_not_found(name: &str) -> Self {
        Self::new("E2001", format!("player not found: {name}")).with_player(name)
    }

    pub fn rate_limited() -> Self {
        Self::new("E2002", "rate limited by stats service").with_status(429)
    }

    pub fn service_error(status: u16) -> Self {
        Self::new("E2003", format!("stats service returned status {status}")).with_status(status)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new("E2004", message)
    }

    pub fn timeout(after_secs: u64) -> Self {
        Self::new("E2005", format!("no response within {after_secs}s"))
    }

    pub fn duplicate_player(name: &str) -> Self {
        Self::new("E3001", format!("player already in comparison: {name}")).with_player(name)
    }

    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
