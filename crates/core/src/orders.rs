//! Orders
//!
//! Order fulfilment and payment states, and the table deciding which
//! transitions between them an administrator may make.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unknown status value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {field}: {value}")]
pub struct UnknownStatus {
    /// Which status field was being parsed.
    pub field: &'static str,

    /// The rejected value.
    pub value: String,
}

/// Fulfilment progress of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, not yet picked up.
    #[default]
    Pending,

    /// Being fulfilled.
    Processing,

    /// Fulfilled.
    Completed,

    /// Abandoned before completion.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no forward transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus {
                field: "status",
                value: value.to_string(),
            })
    }
}

/// Money received for an order, independent of [`OrderStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[default]
    Unpaid,

    /// Paid in full.
    Paid,

    /// Payment returned to the buyer.
    Refunded,
}

impl PaymentStatus {
    /// Every payment status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Unpaid, Self::Paid, Self::Refunded];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus {
                field: "payment status",
                value: value.to_string(),
            })
    }
}

/// Which status changes are permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any value may be set from any value, allowing manual corrections.
    #[default]
    Unconstrained,

    /// Only forward lifecycle moves; terminal states are final.
    ForwardOnly,
}

impl TransitionPolicy {
    /// Whether the outcome of a change depends on the order's current state.
    #[must_use]
    pub const fn depends_on_current_state(self) -> bool {
        matches!(self, Self::ForwardOnly)
    }

    /// Whether `from → to` is allowed for the fulfilment status.
    #[must_use]
    pub const fn allows_status(self, from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::{Cancelled, Completed, Pending, Processing};

        match self {
            Self::Unconstrained => true,
            Self::ForwardOnly => matches!(
                (from, to),
                (Pending, Pending | Processing | Cancelled)
                    | (Processing, Processing | Completed | Cancelled)
                    | (Completed, Completed)
                    | (Cancelled, Cancelled)
            ),
        }
    }

    /// Whether `from → to` is allowed for the payment status.
    #[must_use]
    pub const fn allows_payment(self, from: PaymentStatus, to: PaymentStatus) -> bool {
        use PaymentStatus::{Paid, Refunded, Unpaid};

        match self {
            Self::Unconstrained => true,
            Self::ForwardOnly => matches!(
                (from, to),
                (Unpaid, Unpaid | Paid) | (Paid, Paid | Refunded) | (Refunded, Refunded)
            ),
        }
    }
}
