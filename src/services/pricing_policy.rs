use crate::models::MarketPosition;
use crate::utils::round_money;

/// Max raise when moving toward comparables (high occupancy, below market).
pub const COMP_RAISE_CAP: f64 = 1.15;
/// Max raise when moving toward the median (rising below-market rents).
pub const MEDIAN_RAISE_CAP: f64 = 1.10;
/// Floor when discounting to fill a struggling property.
pub const DISCOUNT_FLOOR: f64 = 0.95;
/// Growth velocity (percent per year) that justifies a median-chasing raise.
pub const GROWTH_RAISE_THRESHOLD: f64 = 4.0;

/// Occupancy bands the pricing table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyBand {
    /// > 85% occupied.
    High,
    /// 60–85% occupied.
    Normal,
    /// < 60% occupied.
    Low,
    /// No occupancy data supplied.
    Unknown,
}

impl OccupancyBand {
    pub fn from_rate(occupancy_rate: Option<f64>) -> Self {
        match occupancy_rate {
            None => OccupancyBand::Unknown,
            Some(rate) if rate > 85.0 => OccupancyBand::High,
            Some(rate) if rate < 60.0 => OccupancyBand::Low,
            Some(_) => OccupancyBand::Normal,
        }
    }
}

/// What the policy decided to do with the rent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PricingAction {
    /// Move toward the average of the best comparables, capped.
    RaiseTowardComparables,
    /// Move down toward the market, floored.
    DiscountToMarket,
    /// Move toward the market median, capped.
    RaiseTowardMedian,
    Hold,
}

#[derive(Debug, Clone)]
pub struct PricingOutcome {
    pub action: PricingAction,
    pub messages: Vec<String>,
}

/// The decision table: occupancy band × market position (plus the growth
/// trigger for below-market units). Every cell resolves to exactly one
/// tagged action, shared by market intelligence and the lease optimizer.
pub fn pricing_rule(
    band: OccupancyBand,
    position: MarketPosition,
    growth_velocity: f64,
) -> PricingOutcome {
    use MarketPosition::*;
    use OccupancyBand::*;

    match (band, position) {
        (High, BelowMarket) => PricingOutcome {
            action: PricingAction::RaiseTowardComparables,
            messages: vec![
                "High occupancy with below-market rent supports an increase".to_string(),
                format!(
                    "Target moves toward comparable rents, capped at {:.0}% above current",
                    (COMP_RAISE_CAP - 1.0) * 100.0
                ),
            ],
        },
        (Low, AboveMarket) | (Low, AtMarket) => PricingOutcome {
            action: PricingAction::DiscountToMarket,
            messages: vec![
                "Low occupancy calls for pricing to fill units".to_string(),
                format!(
                    "Target is the market median, floored at {:.0}% of current rent",
                    DISCOUNT_FLOOR * 100.0
                ),
            ],
        },
        (_, BelowMarket) if growth_velocity > GROWTH_RAISE_THRESHOLD => PricingOutcome {
            action: PricingAction::RaiseTowardMedian,
            messages: vec![
                format!(
                    "Below-market rent in a market growing {:.1}%/yr supports a raise",
                    growth_velocity
                ),
                format!(
                    "Target moves toward the median, capped at {:.0}% above current",
                    (MEDIAN_RAISE_CAP - 1.0) * 100.0
                ),
            ],
        },
        _ => PricingOutcome {
            action: PricingAction::Hold,
            messages: vec![
                "Current rent is appropriate for occupancy and market position".to_string(),
            ],
        },
    }
}

/// Resolve an action to a dollar target. `avg_comparable_rent` is the mean
/// of the best comparables, when any survived filtering.
pub fn target_rent(
    action: PricingAction,
    current_rent: f64,
    market_median: f64,
    avg_comparable_rent: Option<f64>,
) -> f64 {
    let target = match action {
        PricingAction::RaiseTowardComparables => {
            let comp_target = avg_comparable_rent.unwrap_or(market_median);
            comp_target.min(current_rent * COMP_RAISE_CAP)
        }
        PricingAction::DiscountToMarket => market_median.max(current_rent * DISCOUNT_FLOOR),
        PricingAction::RaiseTowardMedian => market_median.min(current_rent * MEDIAN_RAISE_CAP),
        PricingAction::Hold => current_rent,
    };
    round_money(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use MarketPosition::*;
    use OccupancyBand::*;

    #[test]
    fn band_thresholds() {
        assert_eq!(OccupancyBand::from_rate(Some(90.0)), High);
        assert_eq!(OccupancyBand::from_rate(Some(85.0)), Normal);
        assert_eq!(OccupancyBand::from_rate(Some(60.0)), Normal);
        assert_eq!(OccupancyBand::from_rate(Some(59.9)), Low);
        assert_eq!(OccupancyBand::from_rate(None), Unknown);
    }

    #[test]
    fn high_occupancy_below_market_raises_toward_comps() {
        let outcome = pricing_rule(High, BelowMarket, 0.0);
        assert_eq!(outcome.action, PricingAction::RaiseTowardComparables);
    }

    #[test]
    fn low_occupancy_discounts_unless_below_market() {
        assert_eq!(
            pricing_rule(Low, AboveMarket, 6.0).action,
            PricingAction::DiscountToMarket
        );
        assert_eq!(
            pricing_rule(Low, AtMarket, 6.0).action,
            PricingAction::DiscountToMarket
        );
        // Below market, the growth trigger still applies even at low occupancy.
        assert_eq!(
            pricing_rule(Low, BelowMarket, 6.0).action,
            PricingAction::RaiseTowardMedian
        );
        assert_eq!(pricing_rule(Low, BelowMarket, 2.0).action, PricingAction::Hold);
    }

    #[test]
    fn growth_trigger_needs_velocity_above_four() {
        assert_eq!(
            pricing_rule(Normal, BelowMarket, 4.1).action,
            PricingAction::RaiseTowardMedian
        );
        assert_eq!(pricing_rule(Normal, BelowMarket, 4.0).action, PricingAction::Hold);
        assert_eq!(
            pricing_rule(Unknown, BelowMarket, 5.0).action,
            PricingAction::RaiseTowardMedian
        );
    }

    #[test]
    fn remaining_cells_hold() {
        for (band, position) in [
            (High, AboveMarket),
            (High, AtMarket),
            (Normal, AboveMarket),
            (Normal, AtMarket),
            (Unknown, AboveMarket),
            (Unknown, AtMarket),
        ] {
            assert_eq!(
                pricing_rule(band, position, 9.0).action,
                PricingAction::Hold,
                "expected hold for {band:?}/{position:?}"
            );
        }
    }

    #[test]
    fn comp_raise_is_capped_at_fifteen_percent() {
        let target = target_rent(
            PricingAction::RaiseTowardComparables,
            1_000.0,
            1_400.0,
            Some(1_300.0),
        );
        assert_eq!(target, 1_150.0);
        // Comps below the cap pass through.
        let target = target_rent(
            PricingAction::RaiseTowardComparables,
            1_000.0,
            1_400.0,
            Some(1_100.0),
        );
        assert_eq!(target, 1_100.0);
    }

    #[test]
    fn discount_floors_at_ninety_five_percent() {
        assert_eq!(
            target_rent(PricingAction::DiscountToMarket, 2_000.0, 1_700.0, None),
            1_900.0
        );
        assert_eq!(
            target_rent(PricingAction::DiscountToMarket, 2_000.0, 1_950.0, None),
            1_950.0
        );
    }

    #[test]
    fn median_raise_is_capped_at_ten_percent() {
        assert_eq!(
            target_rent(PricingAction::RaiseTowardMedian, 1_000.0, 1_250.0, None),
            1_100.0
        );
        assert_eq!(
            target_rent(PricingAction::RaiseTowardMedian, 1_000.0, 1_050.0, None),
            1_050.0
        );
    }
}
