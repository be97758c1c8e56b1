use super::{ScreenPoint, StereographicProjection};

/// spacing of the samples along each grid line, degrees
const SAMPLE_STEP: f64 = 2.5;
/// major meridians run pole to pole every 90 degrees of azimuth
const MAJOR_STEP: f64 = 90.0;
/// minor meridians stop this far from the horizon plane, minor parallels lie within it
const MINOR_EXTENT: f64 = 80.0;
const EPSILON: f64 = 1e-6;

/// multiples of `step` in [from, to)
fn multiples(step: f64, from: f64, to: f64) -> Vec<f64> {
    let mut k = (from / step).ceil();
    let mut values = vec![];
    while k * step < to {
        values.push(k * step);
        k += 1.0;
    }
    values
}

fn meridian(azimuth: f64, extent: f64) -> Vec<(f64, f64)> {
    let samples = (2.0 * extent / SAMPLE_STEP).round() as usize;
    (0..=samples)
        .map(|k| (azimuth, -extent + k as f64 * SAMPLE_STEP))
        .collect()
}

fn parallel(altitude: f64) -> Vec<(f64, f64)> {
    let samples = (360.0 / SAMPLE_STEP).round() as usize;
    (0..=samples)
        .map(|k| (-180.0 + k as f64 * SAMPLE_STEP, altitude))
        .collect()
}

/// Horizontal-coordinate grid lines as (azimuth, altitude) samples, laid out
/// like a d3 graticule with a `step` minor grid: major meridians every 90
/// degrees from pole to pole and the horizon circle first, then the minor
/// meridians between +-80 degrees and the minor parallels up to +-80 degrees.
pub fn grid_lines(step: f64) -> Vec<Vec<(f64, f64)>> {
    let mut lines: Vec<Vec<(f64, f64)>> = multiples(MAJOR_STEP, -180.0, 180.0)
        .into_iter()
        .map(|azimuth| meridian(azimuth, 90.0))
        .collect();
    lines.push(parallel(0.0));

    for azimuth in multiples(step, -180.0, 180.0) {
        if (azimuth % MAJOR_STEP).abs() > EPSILON {
            lines.push(meridian(azimuth, MINOR_EXTENT));
        }
    }
    for altitude in multiples(step, -MINOR_EXTENT - EPSILON, MINOR_EXTENT + EPSILON) {
        if altitude.abs() > EPSILON {
            lines.push(parallel(altitude));
        }
    }
    lines
}

/// Projects sampled lines, breaking them wherever a sample falls outside the
/// clip circle. Pieces with fewer than two points are dropped.
pub fn project_lines(
    projection: &StereographicProjection,
    lines: &[Vec<(f64, f64)>],
) -> Vec<Vec<ScreenPoint>> {
    let mut pieces = vec![];
    for line in lines {
        let mut current: Vec<ScreenPoint> = vec![];
        for &(azimuth, altitude) in line {
            match projection.project(azimuth, altitude) {
                Some(p) => current.push(p),
                None => {
                    if current.len() >= 2 {
                        pieces.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
        }
        if current.len() >= 2 {
            pieces.push(current);
        }
    }
    pieces
}
