//! Growth Process
//!
//! Owned territories below capacity accrue `growth_rate * elapsed` points.
//! Whole points are applied with floor-on-apply; under
//! [`FractionalGrowth::Carry`] the fractional remainder is kept on the
//! territory so totals do not depend on how time is sliced.

use std::time::Duration;

use crate::config::FractionalGrowth;
use crate::components::territory::TerritoryRegistry;
use crate::events::EventQueue;

/// Absorbs float error so that e.g. ten 0.1s steps at rate 1.0 yield a point.
const CARRY_EPSILON: f64 = 1e-9;

/// Advance growth for every territory. Returns the total points added.
pub fn apply_growth(
    territories: &mut TerritoryRegistry,
    elapsed: Duration,
    policy: FractionalGrowth,
    events: &mut EventQueue,
) -> u64 {
    if elapsed.is_zero() {
        return 0;
    }
    let secs = elapsed.as_secs_f64();
    let mut grown = Vec::new();

    for territory in territories.all_territories_mut() {
        // Neutral or full territories do not accrue, and bank nothing.
        if territory.is_neutral() || territory.is_full() {
            territory.set_growth_carry(0.0);
            continue;
        }

        let accrued = territory.growth_carry() + territory.growth_rate() * secs;
        let whole = (accrued + CARRY_EPSILON).floor();
        let remainder = match policy {
            FractionalGrowth::Carry => (accrued - whole).max(0.0),
            FractionalGrowth::Truncate => 0.0,
        };
        territory.set_growth_carry(remainder);

        if whole >= 1.0 {
            let headroom = territory.max_points() - territory.current_points();
            let points = if whole >= f64::from(headroom) {
                headroom
            } else {
                whole as u32
            };
            grown.push((territory.id.clone(), points));
        }
    }

    let mut total = 0;
    for (id, points) in grown {
        match territories.add_points(id.as_str(), points, events) {
            Ok(added) => {
                total += u64::from(added);
                if territories.find(id.as_str()).map_or(false, |t| t.is_full()) {
                    if let Ok(t) = territories.get_mut(id.as_str()) {
                        t.set_growth_carry(0.0);
                    }
                }
            }
            Err(e) => tracing::warn!(territory = %id, "growth skipped: {}", e),
        }
    }

    tracing::trace!(points = total, elapsed_secs = secs, "growth applied");
    total
}
