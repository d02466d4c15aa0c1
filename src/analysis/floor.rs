use std::collections::BTreeMap;

use crate::data::model::{StationLayout, SurveyTable, pod_of};

const INCHES_PER_FOOT: f64 = 12.0;

// ---------------------------------------------------------------------------
// Floor elevations from lug elevations plus lug-to-floor heights
// ---------------------------------------------------------------------------

/// Floor elevation per point and survey: lug elevation plus the most recent
/// lug-to-floor height measured on or before that survey.
pub fn floor_elevations(lug: &SurveyTable, heights: &SurveyTable) -> SurveyTable {
    let values = lug
        .points
        .iter()
        .zip(&lug.values)
        .map(|(point, row)| {
            lug.dates
                .iter()
                .zip(row)
                .map(|(date, elev)| Some((*elev)? + heights.value_as_of(point, *date)?))
                .collect()
        })
        .collect();

    SurveyTable {
        points: lug.points.clone(),
        dates: lug.dates.clone(),
        values,
    }
}

/// Projected floor elevation: projected lug elevation plus the latest known height.
pub fn project_floor(projected_lug: &SurveyTable, heights: &SurveyTable) -> SurveyTable {
    let latest = heights.latest_date();
    let values = projected_lug
        .points
        .iter()
        .zip(&projected_lug.values)
        .map(|(point, row)| {
            let height = latest.and_then(|d| heights.value_as_of(point, d));
            row.iter().map(|v| Some((*v)? + height?)).collect()
        })
        .collect();

    SurveyTable {
        points: projected_lug.points.clone(),
        dates: projected_lug.dates.clone(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Best-fit plane per pod
// ---------------------------------------------------------------------------

/// Coefficients of `z = a·x + b·y + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Plane {
    pub fn at(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y + self.c
    }
}

/// Least-squares plane through `(x, y, z)` samples via the normal equations.
/// Returns `None` for fewer than three samples or collinear plan positions.
pub fn fit_plane(samples: &[(f64, f64, f64)]) -> Option<Plane> {
    if samples.len() < 3 {
        return None;
    }
    let (mut sxx, mut sxy, mut sx, mut syy, mut sy, mut n) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    let (mut sxz, mut syz, mut sz) = (0.0, 0.0, 0.0);
    for &(x, y, z) in samples {
        sxx += x * x;
        sxy += x * y;
        sx += x;
        syy += y * y;
        sy += y;
        n += 1.0;
        sxz += x * z;
        syz += y * z;
        sz += z;
    }

    let m = [[sxx, sxy, sx], [sxy, syy, sy], [sx, sy, n]];
    let rhs = [sxz, syz, sz];
    let det = det3(&m);
    // Scale-aware singularity check: plan coordinates run to hundreds of feet.
    let scale = m.iter().flatten().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || det.abs() <= 1e-12 * scale.powi(3) {
        return None;
    }

    let solve = |col: usize| {
        let mut mm = m;
        for (row, r) in mm.iter_mut().zip(rhs) {
            row[col] = r;
        }
        det3(&mm) / det
    };
    Some(Plane {
        a: solve(0),
        b: solve(1),
        c: solve(2),
    })
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Summary of a pod's best-fit floor plane at one survey.
#[derive(Debug, Clone, PartialEq)]
pub struct PodPlane {
    pub pod: String,
    pub points: usize,
    /// Mean elevation, feet.
    pub mean: f64,
    pub plane: Plane,
    /// Tilt along x and y, inches per foot.
    pub tilt_x: f64,
    pub tilt_y: f64,
    /// Largest departure of a point from the plane, inches.
    pub max_residual_in: f64,
}

/// Fit a plane per pod through the points with a known plan position.
pub fn pod_planes(elevation: &SurveyTable, layout: &StationLayout, survey: usize) -> Vec<PodPlane> {
    let mut by_pod: BTreeMap<&str, Vec<(f64, f64, f64)>> = BTreeMap::new();
    for (point, row) in elevation.points.iter().zip(&elevation.values) {
        let (Some(z), Some(pos)) = (row.get(survey).copied().flatten(), layout.position_of(point))
        else {
            continue;
        };
        by_pod.entry(pod_of(point)).or_default().push((pos.x, pos.y, z));
    }

    by_pod
        .into_iter()
        .filter_map(|(pod, samples)| {
            let plane = fit_plane(&samples)?;
            let mean = samples.iter().map(|s| s.2).sum::<f64>() / samples.len() as f64;
            let max_residual = samples
                .iter()
                .map(|&(x, y, z)| (z - plane.at(x, y)).abs())
                .fold(0.0, f64::max);
            Some(PodPlane {
                pod: pod.to_string(),
                points: samples.len(),
                mean,
                plane,
                tilt_x: plane.a * INCHES_PER_FOOT,
                tilt_y: plane.b * INCHES_PER_FOOT,
                max_residual_in: max_residual * INCHES_PER_FOOT,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{PlanPoint, PointLabel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn floor_uses_height_as_of_survey() {
        let lug = SurveyTable::new(
            vec!["A1-1".into(), "A1-2".into()],
            vec![date(2010, 1, 1), date(2012, 1, 1), date(2014, 1, 1)],
            vec![
                vec![Some(100.0), Some(99.5), Some(99.0)],
                vec![Some(100.0), None, Some(99.0)],
            ],
        );
        let heights = SurveyTable::new(
            vec!["A1-1".into()],
            vec![date(2011, 6, 1), date(2013, 6, 1)],
            vec![vec![Some(2.0), Some(2.5)]],
        );

        let floor = floor_elevations(&lug, &heights);
        assert_eq!(floor.values[0], vec![None, Some(101.5), Some(101.5)]);
        assert_eq!(floor.values[1], vec![None, None, None]);

        let projected = project_floor(&lug, &heights);
        assert_eq!(projected.values[0], vec![Some(102.5), Some(102.0), Some(101.5)]);
        assert_eq!(projected.values[1], vec![None, None, None]);
    }

    #[test]
    fn plane_through_tilted_points() {
        let samples: Vec<(f64, f64, f64)> = [(0.0, 0.0), (40.0, 0.0), (0.0, 30.0), (40.0, 30.0)]
            .iter()
            .map(|&(x, y)| (x, y, 0.01 * x - 0.02 * y + 100.0))
            .collect();
        let plane = fit_plane(&samples).expect("fit");
        assert!((plane.a - 0.01).abs() < 1e-9);
        assert!((plane.b + 0.02).abs() < 1e-9);
        assert!((plane.c - 100.0).abs() < 1e-6);
    }

    #[test]
    fn plane_rejects_collinear_points() {
        let samples = [(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (20.0, 0.0, 3.0)];
        assert!(fit_plane(&samples).is_none());
        assert!(fit_plane(&samples[..2]).is_none());
    }

    #[test]
    fn pod_planes_group_by_pod() {
        let points = ["A1-1", "A1-2", "A1-3", "B1-1"];
        let positions = [(0.0, 0.0), (40.0, 0.0), (0.0, 40.0), (100.0, 0.0)];
        let table = SurveyTable::new(
            points.iter().map(|p| p.to_string()).collect(),
            vec![date(2020, 1, 1)],
            vec![vec![Some(10.0)], vec![Some(10.5)], vec![Some(10.0)], vec![Some(3.0)]],
        );
        let layout = StationLayout {
            beams: vec![],
            labels: points
                .iter()
                .zip(positions)
                .map(|(p, (x, y))| PointLabel {
                    point: p.to_string(),
                    position: PlanPoint::new(x, y),
                })
                .collect(),
        };

        let planes = pod_planes(&table, &layout, 0);
        assert_eq!(planes.len(), 1);
        let a1 = &planes[0];
        assert_eq!(a1.pod, "A1");
        assert_eq!(a1.points, 3);
        assert!((a1.tilt_x - 0.5 / 40.0 * 12.0).abs() < 1e-9);
        assert!(a1.tilt_y.abs() < 1e-9);
        assert!(a1.max_residual_in < 1e-6);
    }
}
