/// Harvest state definitions for tracking candidate progress
///
/// Every search candidate moves through `Pending → Fetching → {Validated |
/// Skipped | Failed}`. Terminal states never transition further.
use crate::HarvestError;
use std::fmt;

/// Why a candidate was skipped without fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// robots.txt disallows the product page or its reviews API
    Robots,
}

/// Why a candidate failed after fetching started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The product page could not be fetched (hard failure or retries exhausted)
    Fetch,
    /// The product page had no usable embedded payload
    Extraction,
    /// The harvested fields violate a product invariant
    Validation,
}

/// Represents the current state of a candidate in the harvest process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarvestState {
    // ===== Active States =====
    /// Candidate is waiting for a concurrency permit
    Pending,

    /// Candidate's product page and reviews are being fetched
    Fetching,

    // ===== Terminal States =====
    /// A valid product was built
    Validated,

    /// Candidate was skipped by policy
    Skipped(SkipReason),

    /// Candidate could not be turned into a product
    Failed(FailureKind),
}

impl HarvestState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Validated)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Skipping is decided before any request, so it is reachable from
    /// `Pending` only; `Validated` and `Failed` are reachable from `Fetching`.
    pub fn can_transition_to(&self, next: HarvestState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Fetching) => true,
            (Self::Pending, Self::Skipped(_)) => true,
            (Self::Fetching, Self::Validated) => true,
            (Self::Fetching, Self::Failed(_)) => true,
            _ => false,
        }
    }

    /// Performs a transition, rejecting moves the state machine does not allow
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::InvalidTransition` for any disallowed move,
    /// including every move out of a terminal state.
    pub fn transition(self, next: HarvestState) -> Result<HarvestState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Validated => "validated",
            Self::Skipped(SkipReason::Robots) => "skipped_robots",
            Self::Failed(FailureKind::Fetch) => "failed_fetch",
            Self::Failed(FailureKind::Extraction) => "failed_extraction",
            Self::Failed(FailureKind::Validation) => "failed_validation",
        }
    }
}

impl fmt::Display for HarvestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
