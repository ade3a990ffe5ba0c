//! Order lifecycle

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::UnknownVariant;

/// Raised when a status change is not a legal transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: OrderStatus,
    /// Requested status.
    pub to: OrderStatus,
}

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    Created,
    /// A payment completed.
    Paid,
    /// An editor is working on it.
    InProgress,
    /// Revisions requested.
    Revisions,
    /// Work finished.
    Completed,
    /// Handed over to the customer.
    Delivered,
    /// Cancelled before fulfilment.
    Cancelled,
    /// Payment returned.
    Refunded,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Created,
        Self::Paid,
        Self::InProgress,
        Self::Revisions,
        Self::Completed,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    /// Storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::InProgress => "in_progress",
            Self::Revisions => "revisions",
            Self::Completed => "completed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Whether the order has been paid for and not cancelled or refunded.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(
            self,
            Self::Paid | Self::InProgress | Self::Revisions | Self::Completed | Self::Delivered
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }

    /// Whether moving to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Paid | Self::Cancelled)
                | (
                    Self::Paid,
                    Self::InProgress | Self::Cancelled | Self::Refunded
                )
                | (Self::InProgress, Self::Revisions | Self::Completed)
                | (Self::Revisions, Self::InProgress | Self::Completed)
                | (Self::Completed, Self::Delivered)
        )
    }

    /// Validates a move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the move is not allowed.
    pub const fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn happy_path_is_allowed() -> TestResult {
        let path = [
            OrderStatus::Created,
            OrderStatus::Paid,
            OrderStatus::InProgress,
            OrderStatus::Revisions,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Delivered,
        ];

        for pair in path.windows(2) {
            if let [from, to] = pair {
                from.transition_to(*to)?;
            }
        }

        Ok(())
    }

    #[test]
    fn nothing_returns_to_created() {
        for status in OrderStatus::ALL {
            assert!(
                !status.can_transition_to(OrderStatus::Created),
                "{status} must not return to created"
            );
        }
    }

    #[test]
    fn refund_requires_paid() {
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn cancellation_only_before_work_starts() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn skipping_payment_is_rejected() {
        assert_eq!(
            OrderStatus::Created.transition_to(OrderStatus::InProgress),
            Err(TransitionError {
                from: OrderStatus::Created,
                to: OrderStatus::InProgress,
            })
        );
    }

    #[test]
    fn parses_wire_names() -> TestResult {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        Ok(())
    }
}
