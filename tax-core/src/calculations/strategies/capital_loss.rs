//! Capital-loss harvesting.
//!
//! A long/short overlay realizes short-term losses and some long-term gains
//! in proportion to the amount invested. Losses cascade: short-term gains
//! first, then long-term gains, then up to the annual ordinary-income limit.
//! Anything beyond that limit carries forward and does not affect this year.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::TaxEngineError;
use crate::calculations::accumulator::{Accumulator, StrategyContext};
use crate::calculations::common::{min, round_half_up};
use crate::models::{ReasonCode, StrategyDelta, StrategyId};

const ID: StrategyId = StrategyId::CapitalLossHarvesting;

/// Losses and gains the overlay realizes this year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestYield {
    pub short_term_loss: Decimal,
    pub long_term_gain: Decimal,
}

/// Looks up the profile's exposure level and computes the harvest.
///
/// # Errors
///
/// [`TaxEngineError::MissingExposureLevel`] when the profile names no level,
/// [`TaxEngineError::UnknownExposureLevel`] when the label is not in the table.
pub fn harvest_yield(
    ctx: &StrategyContext<'_>,
    amount: Decimal,
) -> Result<HarvestYield, TaxEngineError> {
    let label = ctx
        .profile
        .exposure_level
        .as_deref()
        .ok_or(TaxEngineError::MissingExposureLevel)?;
    let rates = ctx
        .tables
        .exposure_levels
        .get(label)
        .ok_or_else(|| {
            let known: Vec<_> = ctx.tables.exposure_levels.labels().collect();
            warn!(label, ?known, "exposure level not in tables");
            TaxEngineError::UnknownExposureLevel(label.to_string())
        })?;

    Ok(HarvestYield {
        short_term_loss: round_half_up(amount * rates.short_term_loss_rate),
        long_term_gain: round_half_up(amount * rates.long_term_gain_rate),
    })
}

pub fn apply(
    ctx: &StrategyContext<'_>,
    amount: Decimal,
    acc: Accumulator,
) -> Result<Accumulator, TaxEngineError> {
    let harvest = harvest_yield(ctx, amount)?;
    debug!(
        short_term_loss = %harvest.short_term_loss,
        long_term_gain = %harvest.long_term_gain,
        "harvest yield"
    );
    Ok(cascade(
        harvest,
        ctx.federal().capital_loss_ordinary_offset_limit,
        acc,
    ))
}

/// Applies a harvest to the accumulator's gains.
pub fn cascade(
    harvest: HarvestYield,
    ordinary_offset_limit: Decimal,
    mut acc: Accumulator,
) -> Accumulator {
    let short_term_offset = min(acc.short_term_gains, harvest.short_term_loss);
    acc.short_term_gains -= short_term_offset;
    let mut remaining_loss = harvest.short_term_loss - short_term_offset;
    acc.record(StrategyDelta::success(
        ID,
        ReasonCode::ShortTermGainsOffset,
        short_term_offset,
    ));

    let long_term_offset = min(acc.long_term_gains, remaining_loss);
    acc.long_term_gains -= long_term_offset;
    remaining_loss -= long_term_offset;
    if long_term_offset > Decimal::ZERO {
        acc.record(StrategyDelta::success(
            ID,
            ReasonCode::LongTermGainsOffset,
            long_term_offset,
        ));
    }

    acc.long_term_gains += harvest.long_term_gain;
    if harvest.long_term_gain > Decimal::ZERO {
        acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::LongTermGainGenerated,
            harvest.long_term_gain,
        ));
    }

    let ordinary_offset = min(remaining_loss, ordinary_offset_limit);
    acc.below_agi += ordinary_offset;
    acc.state_deduction_total += ordinary_offset;
    if ordinary_offset > Decimal::ZERO {
        acc.record(StrategyDelta::success(
            ID,
            ReasonCode::OrdinaryIncomeOffset,
            ordinary_offset,
        ));
    }

    let carried_forward = remaining_loss - ordinary_offset;
    if carried_forward > Decimal::ZERO {
        acc.record(StrategyDelta::warning(
            ID,
            ReasonCode::ExcessLossCarriedForward,
            carried_forward,
        ));
    }

    acc
}
