use serde::{Deserialize, Serialize};

use super::super::domain::RegimeConfig;

/// First fiscal year whose credits accumulate under the reformed rules.
pub(crate) const ACCUMULATION_BOUNDARY_YEAR: i32 = 2020;

/// What to do when a record's regime configuration fails validation.
///
/// `ZeroCredits` keeps a single malformed regime from aborting an entire
/// filing run; `Propagate` surfaces the failure to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRegimePolicy {
    ZeroCredits,
    Propagate,
}

impl Default for InvalidRegimePolicy {
    fn default() -> Self {
        InvalidRegimePolicy::ZeroCredits
    }
}

impl InvalidRegimePolicy {
    pub const fn label(self) -> &'static str {
        match self {
            InvalidRegimePolicy::ZeroCredits => "zero_credits",
            InvalidRegimePolicy::Propagate => "propagate",
        }
    }
}

/// The six mutually-exclusive destinations a taxable-income credit can land
/// in (declaration columns 17..22).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaxableDestination {
    AccumulatedPre2020,
    AccumulatedPre2020Refundable,
    AccumulatedPost2020,
    AccumulatedPost2020Refundable,
    Restitution,
    RestitutionRefundable,
}

/// Destination decision table: restitution obligation wins over the
/// accumulation window, and the refund right picks the column inside each
/// pair.
pub(crate) fn taxable_destination(regime: &RegimeConfig) -> TaxableDestination {
    if regime.restitution {
        return if regime.refund_right {
            TaxableDestination::RestitutionRefundable
        } else {
            TaxableDestination::Restitution
        };
    }

    if regime.fiscal_year >= ACCUMULATION_BOUNDARY_YEAR {
        if regime.refund_right {
            TaxableDestination::AccumulatedPost2020Refundable
        } else {
            TaxableDestination::AccumulatedPost2020
        }
    } else if regime.refund_right {
        TaxableDestination::AccumulatedPre2020Refundable
    } else {
        TaxableDestination::AccumulatedPre2020
    }
}
