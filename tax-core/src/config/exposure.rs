use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Loss and gain rates a harvesting overlay realizes per dollar invested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRates {
    pub short_term_loss_rate: Decimal,
    pub long_term_gain_rate: Decimal,
}

/// Named exposure levels for the loss-harvesting strategy.
///
/// Lookups are exact; an unknown label is a configuration error upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureTable {
    levels: BTreeMap<String, ExposureRates>,
}

impl ExposureTable {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Long/short overlays keyed by gross long/short exposure.
    pub fn default_levels() -> Self {
        let mut table = Self::new();
        table.insert("130/30", dec!(0.25), dec!(0.02));
        table.insert("145/45", dec!(0.40), dec!(0.03));
        table.insert("175/75", dec!(0.65), dec!(0.05));
        table.insert("225/125", dec!(1.00), dec!(0.08));
        table
    }

    pub fn insert(
        &mut self,
        label: &str,
        short_term_loss_rate: Decimal,
        long_term_gain_rate: Decimal,
    ) {
        self.levels.insert(
            label.to_string(),
            ExposureRates {
                short_term_loss_rate,
                long_term_gain_rate,
            },
        );
    }

    pub fn get(
        &self,
        label: &str,
    ) -> Option<ExposureRates> {
        self.levels.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &ExposureRates)> {
        self.levels.iter().map(|(label, rates)| (label.as_str(), rates))
    }
}

impl Default for ExposureTable {
    fn default() -> Self {
        Self::default_levels()
    }
}
