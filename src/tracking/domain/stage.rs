//! Order stages and the fixed lifecycle sequence.

use super::TrackingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a placed order.
///
/// Variants are declared in lifecycle order; the derived `Ord` follows it.
/// The discriminant is the lifecycle position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OrderStage {
    /// The restaurant has confirmed the order.
    #[default]
    Confirmed = 0,
    /// The kitchen is preparing the order.
    Preparing = 1,
    /// A courier is on the way.
    OutForDelivery = 2,
    /// The order has reached the customer.
    Delivered = 3,
}

impl OrderStage {
    /// Every stage in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Number of stages in the lifecycle.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the canonical tag representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
        }
    }

    /// Returns the stable position of this stage in [`STAGE_SEQUENCE`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the stage position as a small integer for progress
    /// arithmetic.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks up the stage at `index` in the lifecycle sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::InvalidStage`] when `index` is outside
    /// the sequence.
    pub fn from_index(index: usize) -> Result<Self, TrackingDomainError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| TrackingDomainError::InvalidStage(format!("index {index}")))
    }

    /// Returns the stage that follows this one, or `None` at the terminal
    /// stage.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Returns `true` for the final stage of the lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Returns the static display data for this stage.
    #[must_use]
    pub const fn descriptor(self) -> &'static StageDescriptor {
        match self {
            Self::Confirmed => &STAGE_SEQUENCE[0],
            Self::Preparing => &STAGE_SEQUENCE[1],
            Self::OutForDelivery => &STAGE_SEQUENCE[2],
            Self::Delivered => &STAGE_SEQUENCE[3],
        }
    }
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OrderStage {
    type Error = TrackingDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "CONFIRMED" => Ok(Self::Confirmed),
            "PREPARING" => Ok(Self::Preparing),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            _ => Err(TrackingDomainError::InvalidStage(value.to_owned())),
        }
    }
}

/// Icon reference attached to a stage.
///
/// Opaque to the engine; renderers map it to a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageIcon {
    /// Tick inside a circle.
    CheckCircle,
    /// Chef's hat.
    ChefHat,
    /// Delivery bike.
    Bike,
    /// Package with a tick.
    PackageCheck,
}

impl StageIcon {
    /// Returns the kebab-case icon name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckCircle => "check-circle",
            Self::ChefHat => "chef-hat",
            Self::Bike => "bike",
            Self::PackageCheck => "package-check",
        }
    }
}

/// Static display data for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Stage tag.
    pub stage: OrderStage,
    /// Human-readable stage name.
    pub name: &'static str,
    /// One-line description shown to the customer.
    pub description: &'static str,
    /// Icon reference.
    pub icon: StageIcon,
}

/// The order lifecycle. Its order is the lifecycle order.
pub static STAGE_SEQUENCE: [StageDescriptor; OrderStage::COUNT] = [
    StageDescriptor {
        stage: OrderStage::Confirmed,
        name: "Confirmed",
        description: "Your order has been confirmed by the restaurant.",
        icon: StageIcon::CheckCircle,
    },
    StageDescriptor {
        stage: OrderStage::Preparing,
        name: "Preparing",
        description: "The chef is preparing your delicious meal.",
        icon: StageIcon::ChefHat,
    },
    StageDescriptor {
        stage: OrderStage::OutForDelivery,
        name: "Out for Delivery",
        description: "Your order is on its way to you!",
        icon: StageIcon::Bike,
    },
    StageDescriptor {
        stage: OrderStage::Delivered,
        name: "Delivered",
        description: "Enjoy your meal! Your order has been delivered.",
        icon: StageIcon::PackageCheck,
    },
];
