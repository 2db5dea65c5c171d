//! Pure numeric formulas backing `Calculate` requirements.

use super::domain::UnitSystem;
use serde::{Deserialize, Serialize};

/// End-of-life refrigerant loss assumed for every piece of equipment.
const MAINTENANCE_FACTOR: f64 = 1.0;
/// Weighting of ozone depletion relative to global warming potential.
const ODP_WEIGHT: f64 = 100_000.0;
const IMPERIAL_IMPACT_THRESHOLD: f64 = 100.0;
const METRIC_IMPACT_THRESHOLD: f64 = 13.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculationError {
    /// Expected domain failure; reported as non-compliance.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// Input shape the formula cannot work with at all.
    #[error("malformed calculation input: {0}")]
    MalformedInput(String),
}

impl CalculationError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// One equipment group contributing to the refrigerant impact average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefrigerantGroup {
    pub gwp: f64,
    pub odp: f64,
    pub refrigerant_charge: f64,
    pub leakage_rate_percent: f64,
    pub equipment_life: f64,
    pub cooling_capacity: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefrigerantImpact {
    pub lcodp: f64,
    pub lcgwp: f64,
    pub unit_impact: f64,
    pub weighted_average: f64,
    pub threshold: f64,
    pub compliant: bool,
}

pub fn impact_threshold(unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::Imperial => IMPERIAL_IMPACT_THRESHOLD,
        UnitSystem::Metric => METRIC_IMPACT_THRESHOLD,
    }
}

/// Life-cycle impact of a single equipment group, before any fleet weighting.
///
/// Returns `(lcodp, lcgwp, unit_impact)`.
fn group_unit_impact(group: &RefrigerantGroup) -> Result<(f64, f64, f64), CalculationError> {
    if group.equipment_life <= 0.0 {
        return Err(CalculationError::invalid(
            "Equipment Life",
            format!("must be greater than zero, found {}", group.equipment_life),
        ));
    }

    let leakage_rate = group.leakage_rate_percent / 100.0;
    let lifetime_loss = leakage_rate * group.equipment_life + MAINTENANCE_FACTOR;
    let lcodp = group.odp * lifetime_loss * group.refrigerant_charge / group.equipment_life;
    let lcgwp = group.gwp * lifetime_loss * group.refrigerant_charge / group.equipment_life;

    Ok((lcodp, lcgwp, lcgwp + lcodp * ODP_WEIGHT))
}

/// Capacity-weighted accumulator across equipment groups.
///
/// Every group adds `unit_impact * capacity * quantity` to the running impact and
/// `capacity * quantity` to the running capacity; the average is taken only when
/// all groups have been added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefrigerantFleet {
    total_impact: f64,
    total_capacity: f64,
    groups: usize,
}

impl RefrigerantFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: &RefrigerantGroup) -> Result<f64, CalculationError> {
        let (_, _, unit_impact) = group_unit_impact(group)?;
        if group.cooling_capacity < 0.0 {
            return Err(CalculationError::invalid(
                "Equipment Cooling Capacity",
                format!("must not be negative, found {}", group.cooling_capacity),
            ));
        }
        if group.quantity < 0.0 {
            return Err(CalculationError::invalid(
                "Equipment Quantity",
                format!("must not be negative, found {}", group.quantity),
            ));
        }
        let capacity = group.cooling_capacity * group.quantity;

        self.total_impact += unit_impact * capacity;
        self.total_capacity += capacity;
        self.groups += 1;
        Ok(unit_impact)
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn total_capacity(&self) -> f64 {
        self.total_capacity
    }

    pub fn weighted_average(&self) -> Result<f64, CalculationError> {
        if self.total_capacity <= 0.0 {
            return Err(CalculationError::invalid(
                "Equipment Cooling Capacity",
                "total cooling capacity must be greater than zero",
            ));
        }
        Ok(self.total_impact / self.total_capacity)
    }
}

/// Refrigerant impact for a single equipment group of `quantity` identical units.
pub fn refrigerant_impact(
    group: &RefrigerantGroup,
    unit_system: UnitSystem,
) -> Result<RefrigerantImpact, CalculationError> {
    let (lcodp, lcgwp, unit_impact) = group_unit_impact(group)?;

    let mut fleet = RefrigerantFleet::new();
    fleet.add_group(group)?;
    let weighted_average = fleet.weighted_average()?;
    let threshold = impact_threshold(unit_system);

    Ok(RefrigerantImpact {
        lcodp,
        lcgwp,
        unit_impact,
        weighted_average,
        threshold,
        compliant: weighted_average <= threshold,
    })
}

/// Share of occupant spaces with individual thermal comfort controls. Not clamped.
pub fn thermal_control_percentage(
    total_spaces: f64,
    controlled_spaces: f64,
) -> Result<f64, CalculationError> {
    if total_spaces <= 0.0 {
        return Err(CalculationError::invalid(
            "Total Individual Spaces",
            format!("must be greater than zero, found {total_spaces}"),
        ));
    }
    Ok(controlled_spaces / total_spaces * 100.0)
}

/// Percentage reduction of a design value against its baseline.
pub fn linear_reduction_percentage(baseline: f64, design: f64) -> Result<f64, CalculationError> {
    if !baseline.is_finite() || baseline == 0.0 {
        return Err(CalculationError::invalid(
            "baseline",
            format!("must be a non-zero number, found {baseline}"),
        ));
    }
    Ok((baseline - design) / baseline * 100.0)
}

/// Threshold row of a tiered point table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointTier {
    pub threshold_percent: f64,
    pub points: u32,
}

impl PointTier {
    pub const fn new(threshold_percent: f64, points: u32) -> Self {
        Self {
            threshold_percent,
            points,
        }
    }
}

/// Highest award whose threshold the percentage reaches. Tables need not be sorted.
pub fn tiered_point_lookup(percentage: f64, table: &[PointTier]) -> u32 {
    table
        .iter()
        .filter(|tier| tier.threshold_percent <= percentage)
        .map(|tier| tier.points)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chiller_group() -> RefrigerantGroup {
        RefrigerantGroup {
            gwp: 2088.0,
            odp: 0.0,
            refrigerant_charge: 8.0,
            leakage_rate_percent: 15.0,
            equipment_life: 15.0,
            cooling_capacity: 25.0,
            quantity: 10.0,
        }
    }

    #[test]
    fn single_group_average_matches_unit_impact() {
        let mut group = chiller_group();
        group.quantity = 1.0;

        let impact = refrigerant_impact(&group, UnitSystem::Imperial).expect("impact computes");

        assert_relative_eq!(impact.weighted_average, impact.unit_impact, epsilon = 1e-9);
    }

    #[test]
    fn high_gwp_fleet_exceeds_imperial_threshold() {
        let impact =
            refrigerant_impact(&chiller_group(), UnitSystem::Imperial).expect("impact computes");

        assert_relative_eq!(impact.lcgwp, 2088.0 * 3.25 * 8.0 / 15.0, epsilon = 1e-9);
        assert_eq!(impact.lcodp, 0.0);
        assert_eq!(impact.threshold, 100.0);
        assert!(impact.weighted_average > 100.0);
        assert!(!impact.compliant);
    }

    #[test]
    fn ozone_depletion_is_weighted_heavily() {
        let group = RefrigerantGroup {
            gwp: 0.0,
            odp: 0.0001,
            refrigerant_charge: 1.0,
            leakage_rate_percent: 0.0,
            equipment_life: 1.0,
            cooling_capacity: 1.0,
            quantity: 1.0,
        };

        let impact = refrigerant_impact(&group, UnitSystem::Metric).expect("impact computes");

        assert_relative_eq!(impact.unit_impact, 10.0, epsilon = 1e-9);
        assert_eq!(impact.threshold, 13.0);
        assert!(impact.compliant);
    }

    #[test]
    fn fleet_average_weights_by_capacity() {
        let low = RefrigerantGroup {
            gwp: 10.0,
            odp: 0.0,
            refrigerant_charge: 1.0,
            leakage_rate_percent: 0.0,
            equipment_life: 1.0,
            cooling_capacity: 90.0,
            quantity: 1.0,
        };
        let high = RefrigerantGroup {
            gwp: 110.0,
            cooling_capacity: 10.0,
            ..low
        };

        let mut fleet = RefrigerantFleet::new();
        fleet.add_group(&low).expect("low group");
        fleet.add_group(&high).expect("high group");

        assert_eq!(fleet.groups(), 2);
        assert_relative_eq!(fleet.total_capacity(), 100.0);
        assert_relative_eq!(
            fleet.weighted_average().expect("average"),
            20.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn zero_equipment_life_is_invalid_input() {
        let mut group = chiller_group();
        group.equipment_life = 0.0;

        match refrigerant_impact(&group, UnitSystem::Imperial) {
            Err(CalculationError::InvalidInput { field, .. }) => {
                assert_eq!(field, "Equipment Life")
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn negative_capacity_and_quantity_are_each_rejected() {
        let mut both = chiller_group();
        both.cooling_capacity = -25.0;
        both.quantity = -10.0;

        let mut fleet = RefrigerantFleet::new();
        match fleet.add_group(&both) {
            Err(CalculationError::InvalidInput { field, .. }) => {
                assert_eq!(field, "Equipment Cooling Capacity")
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
        assert_eq!(fleet.groups(), 0);

        let mut quantity = chiller_group();
        quantity.quantity = -1.0;
        match refrigerant_impact(&quantity, UnitSystem::Imperial) {
            Err(CalculationError::InvalidInput { field, .. }) => {
                assert_eq!(field, "Equipment Quantity")
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn empty_fleet_has_no_average() {
        assert!(matches!(
            RefrigerantFleet::new().weighted_average(),
            Err(CalculationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn thermal_percentage_rejects_zero_total() {
        for controlled in [0.0, 5.0, -3.0] {
            assert!(matches!(
                thermal_control_percentage(0.0, controlled),
                Err(CalculationError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn thermal_percentage_is_not_clamped() {
        assert_relative_eq!(
            thermal_control_percentage(200.0, 85.0).expect("valid"),
            42.5
        );
        assert_relative_eq!(
            thermal_control_percentage(10.0, 15.0).expect("valid"),
            150.0
        );
        assert_relative_eq!(
            thermal_control_percentage(10.0, -1.0).expect("valid"),
            -10.0
        );
    }

    #[test]
    fn linear_reduction_requires_non_zero_baseline() {
        assert_relative_eq!(
            linear_reduction_percentage(200_000.0, 150_000.0).expect("valid"),
            25.0
        );
        assert!(linear_reduction_percentage(0.0, 10.0).is_err());
        assert!(linear_reduction_percentage(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn tier_lookup_keeps_maximum_qualifying_award() {
        let unsorted = [
            PointTier::new(20.0, 3),
            PointTier::new(5.0, 1),
            PointTier::new(10.0, 2),
            PointTier::new(40.0, 5),
        ];

        assert_eq!(tiered_point_lookup(22.0, &unsorted), 3);
        assert_eq!(tiered_point_lookup(10.0, &unsorted), 2);
        assert_eq!(tiered_point_lookup(4.9, &unsorted), 0);
        assert_eq!(tiered_point_lookup(99.0, &unsorted), 5);
    }
}
