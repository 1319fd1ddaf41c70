use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of customer-service incidents that can appear on the board.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    PackageMissing,
    WrongShipping,
    CanceledSale,
    UrgentMessage,
    CouponIssue,
    #[serde(alias = "system_down")]
    SystemOutage,
    ReputationDrop,
    DuplicateOrder,
}

/// Stress penalty tier applied when a board task expires unclicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTier {
    Standard,
    Severe,
}

/// Mini-interaction presented when a queued task is opened.
///
/// The engine never inspects the interaction itself; the kind is forwarded
/// to the presentation layer so it can pick the matching widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    FileComplaint,
    ChooseShipping,
    PickCancellationReason,
    ReplyToCustomer,
    IssueCoupon,
    RebootSequence,
    AdjustIndicators,
    CancelDuplicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub timeout_penalty: PenaltyTier,
    pub clicks_required: u8,
    pub resolution: ResolutionKind,
}

impl CategoryDescriptor {
    const fn single(resolution: ResolutionKind) -> Self {
        Self {
            timeout_penalty: PenaltyTier::Standard,
            clicks_required: 1,
            resolution,
        }
    }

    pub fn requires_multi_click(&self) -> bool {
        self.clicks_required > 1
    }
}

// Indexed by `TaskCategory as usize`.
const DESCRIPTORS: [CategoryDescriptor; TaskCategory::COUNT] = [
    CategoryDescriptor::single(ResolutionKind::FileComplaint),
    CategoryDescriptor::single(ResolutionKind::ChooseShipping),
    CategoryDescriptor::single(ResolutionKind::PickCancellationReason),
    CategoryDescriptor::single(ResolutionKind::ReplyToCustomer),
    CategoryDescriptor::single(ResolutionKind::IssueCoupon),
    CategoryDescriptor {
        timeout_penalty: PenaltyTier::Standard,
        clicks_required: 3,
        resolution: ResolutionKind::RebootSequence,
    },
    CategoryDescriptor {
        timeout_penalty: PenaltyTier::Severe,
        clicks_required: 1,
        resolution: ResolutionKind::AdjustIndicators,
    },
    CategoryDescriptor::single(ResolutionKind::CancelDuplicate),
];

impl TaskCategory {
    pub const COUNT: usize = 8;

    pub const ALL: [TaskCategory; TaskCategory::COUNT] = [
        TaskCategory::PackageMissing,
        TaskCategory::WrongShipping,
        TaskCategory::CanceledSale,
        TaskCategory::UrgentMessage,
        TaskCategory::CouponIssue,
        TaskCategory::SystemOutage,
        TaskCategory::ReputationDrop,
        TaskCategory::DuplicateOrder,
    ];

    pub fn descriptor(self) -> &'static CategoryDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn clicks_required(self) -> u8 {
        self.descriptor().clicks_required
    }

    pub fn timeout_penalty(self) -> PenaltyTier {
        self.descriptor().timeout_penalty
    }

    pub fn resolution(self) -> ResolutionKind {
        self.descriptor().resolution
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::PackageMissing => "package_missing",
            TaskCategory::WrongShipping => "wrong_shipping",
            TaskCategory::CanceledSale => "canceled_sale",
            TaskCategory::UrgentMessage => "urgent_message",
            TaskCategory::CouponIssue => "coupon_issue",
            TaskCategory::SystemOutage => "system_outage",
            TaskCategory::ReputationDrop => "reputation_drop",
            TaskCategory::DuplicateOrder => "duplicate_order",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system_down" => Ok(TaskCategory::SystemOutage),
            other => TaskCategory::ALL
                .into_iter()
                .find(|category| category.as_str() == other)
                .ok_or_else(|| other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_outage_needs_multiple_clicks() {
        for category in TaskCategory::ALL {
            let expected = if category == TaskCategory::SystemOutage {
                3
            } else {
                1
            };
            assert_eq!(category.clicks_required(), expected, "{category}");
        }
    }

    #[test]
    fn only_reputation_drop_is_severe() {
        let severe: Vec<_> = TaskCategory::ALL
            .into_iter()
            .filter(|category| category.timeout_penalty() == PenaltyTier::Severe)
            .collect();
        assert_eq!(severe, vec![TaskCategory::ReputationDrop]);
    }

    #[test]
    fn legacy_outage_name_is_accepted() {
        assert_eq!(
            "system_down".parse::<TaskCategory>().unwrap(),
            TaskCategory::SystemOutage
        );
        let parsed: TaskCategory = serde_json::from_str("\"system_down\"").unwrap();
        assert_eq!(parsed, TaskCategory::SystemOutage);
        assert_eq!(TaskCategory::SystemOutage.to_string(), "system_outage");
    }
}
