//! Plot grid layout: where a plot sits on the ground.
//!
//! Each zone owns a quadrant of the farm. Inside a zone, plots fill rows of
//! `PLOTS_PER_ROW` in id order, `PLOT_SPACING` apart. The farmhouse (where
//! new workers appear) is the origin, between the quadrants.

use crate::constants::PlotZone;

pub const PLOTS_PER_ROW: usize = 5;
pub const PLOT_SPACING: f32 = 2.0;
pub const ZONE_SEPARATION_X: f32 = 14.0;
pub const ZONE_SEPARATION_Y: f32 = 14.0;

/// Corner of a zone's quadrant relative to the farmhouse.
pub fn zone_offset(zone: PlotZone) -> (f32, f32) {
    let half_x = ZONE_SEPARATION_X / 2.0;
    let half_y = ZONE_SEPARATION_Y / 2.0;
    match zone {
        PlotZone::Strawberry => (-half_x - 8.0, -half_y - 8.0),
        PlotZone::Tomato => (half_x, -half_y - 8.0),
        PlotZone::Blueberry => (-half_x - 8.0, half_y),
        PlotZone::Cow => (half_x, half_y),
    }
}

/// World position of the `index_in_zone`-th plot of `zone`.
pub fn plot_position(zone: PlotZone, index_in_zone: usize) -> (f32, f32) {
    let (ox, oy) = zone_offset(zone);
    let row = index_in_zone / PLOTS_PER_ROW;
    let col = index_in_zone % PLOTS_PER_ROW;
    (
        ox + col as f32 * PLOT_SPACING,
        oy + row as f32 * PLOT_SPACING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_wrap() {
        let first = plot_position(PlotZone::Cow, 0);
        let sixth = plot_position(PlotZone::Cow, PLOTS_PER_ROW);
        assert_eq!(sixth.0, first.0);
        assert_eq!(sixth.1, first.1 + PLOT_SPACING);
    }

    #[test]
    fn test_zones_do_not_overlap() {
        // A full zone of 16 plots stays inside its quadrant
        let mut positions = Vec::new();
        for zone in PlotZone::ALL {
            for i in 0..16 {
                positions.push(plot_position(zone, i));
            }
        }
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                assert!(d >= PLOT_SPACING - 0.001, "{:?} and {:?} overlap", a, b);
            }
        }
    }
}
