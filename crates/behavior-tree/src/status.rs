//! Status returned by behavior nodes.

/// The result of evaluating a behavior node.
///
/// # Turn-based Semantics
///
/// Every tick completes synchronously. `Running` is a logical continuation
/// marker: the node has more work to do and expects to be ticked again on a
/// later turn. It is never a suspension point inside a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The behavior completed successfully.
    ///
    /// For conditions: The condition was met.
    /// For actions: The action executed without errors.
    Success,

    /// The behavior failed.
    ///
    /// For conditions: The condition was not met.
    /// For actions: The action could not be executed (e.g., invalid move).
    Failure,

    /// The behavior has not finished and should be ticked again.
    Running,

    /// The node is structurally malformed (e.g., a decorator without exactly
    /// one child). Distinct from `Failure` so configuration bugs can be told
    /// apart from legitimate decision failures.
    Invalid,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Returns `true` if this status is `Invalid`.
    #[inline]
    pub fn is_invalid(self) -> bool {
        matches!(self, Status::Invalid)
    }

    /// Inverts the status: Success becomes Failure and vice versa.
    ///
    /// `Running` and `Invalid` pass through unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Running => "running",
            Status::Invalid => "invalid",
        }
    }
}
