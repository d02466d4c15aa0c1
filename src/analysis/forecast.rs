use chrono::{Datelike, NaiveDate};

use super::error::AnalysisError;
use crate::data::model::SurveyTable;

// ---------------------------------------------------------------------------
// Least-squares line
// ---------------------------------------------------------------------------

/// Ordinary least-squares line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation; 0 when `y` is constant.
    pub r_value: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `(x, y)` pairs. Needs two distinct `x` values.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx <= f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    let r_value = if syy > 0.0 { sxy / (sxx * syy).sqrt() } else { 0.0 };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_value,
    })
}

/// Days since the common era; the x axis of every regression.
pub fn ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Per-point regression over the most recent surveys, evaluated at the
/// window endpoints and at January 1 of each forecast year.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Projected values; dates are `[window start, window end, Jan 1 …]`.
    pub table: SurveyTable,
    /// Fit per point, `None` when the window held fewer than two values.
    pub fits: Vec<Option<LinearFit>>,
}

impl Forecast {
    /// Dates strictly after the last survey.
    pub fn future_dates(&self) -> &[NaiveDate] {
        self.table.dates.get(2..).unwrap_or(&[])
    }
}

/// Dates a forecast is evaluated at.
pub fn forecast_dates(window_start: NaiveDate, window_end: NaiveDate, years: u32) -> Vec<NaiveDate> {
    let mut dates = vec![window_start, window_end];
    dates.extend(
        (1..=years as i32).filter_map(|k| NaiveDate::from_ymd_opt(window_end.year() + k, 1, 1)),
    );
    dates
}

/// Fit each point over its last `surveys` surveys and project `years` ahead.
pub fn forecast(table: &SurveyTable, surveys: usize, years: u32) -> Result<Forecast, AnalysisError> {
    let available = table.survey_count();
    if table.is_empty() || available == 0 {
        return Err(AnalysisError::EmptySurvey);
    }
    if surveys < 2 || surveys > available {
        return Err(AnalysisError::ForecastWindow {
            requested: surveys,
            available,
        });
    }

    let start = available - surveys;
    let window = &table.dates[start..];
    let dates = forecast_dates(window[0], window[window.len() - 1], years);
    let eval_x: Vec<f64> = dates.iter().copied().map(ordinal).collect();

    let mut fits = Vec::with_capacity(table.len());
    let mut values = Vec::with_capacity(table.len());
    for row in &table.values {
        let (xs, ys): (Vec<f64>, Vec<f64>) = window
            .iter()
            .zip(&row[start..])
            .filter_map(|(d, v)| v.map(|v| (ordinal(*d), v)))
            .unzip();

        let fit = linear_fit(&xs, &ys);
        values.push(
            eval_x
                .iter()
                .map(|&x| fit.map(|f| round3(f.at(x))))
                .collect(),
        );
        fits.push(fit);
    }

    Ok(Forecast {
        table: SurveyTable {
            points: table.points.clone(),
            dates,
            values,
        },
        fits,
    })
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fit_recovers_exact_line() {
        let fit = linear_fit(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fit_needs_spread_in_x() {
        assert!(linear_fit(&[1.0], &[2.0]).is_none());
        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        let flat = linear_fit(&[0.0, 1.0], &[4.0, 4.0]).unwrap();
        assert_eq!(flat.r_value, 0.0);
    }

    #[test]
    fn forecast_dates_are_new_years_after_last_survey() {
        let dates = forecast_dates(date(2015, 12, 1), date(2022, 12, 15), 3);
        assert_eq!(
            dates,
            vec![
                date(2015, 12, 1),
                date(2022, 12, 15),
                date(2023, 1, 1),
                date(2024, 1, 1),
                date(2025, 1, 1),
            ]
        );
    }

    #[test]
    fn forecast_extends_trend_over_window() {
        // Settles 0.1 ft per survey day-spacing; earliest survey is outside the window.
        let d0 = date(2020, 1, 1);
        let dates: Vec<NaiveDate> = (0..4).map(|k| d0 + chrono::Days::new(100 * k)).collect();
        let table = SurveyTable::new(
            vec!["A1-1".into(), "A1-2".into()],
            dates.clone(),
            vec![
                vec![Some(9.0), Some(0.0), Some(0.1), Some(0.2)],
                vec![None, None, None, Some(1.0)],
            ],
        );

        let f = forecast(&table, 3, 1).expect("forecast");
        assert_eq!(f.table.dates, vec![dates[1], dates[3], date(2021, 1, 1)]);
        assert_eq!(f.table.values[0][0], Some(0.0));
        assert_eq!(f.table.values[0][1], Some(0.2));
        // 2020-01-01 + 300 days = 2020-10-27; Jan 1 2021 is 66 days later.
        assert_eq!(f.table.values[0][2], Some(0.266));
        assert_eq!(f.future_dates(), &[date(2021, 1, 1)]);

        assert!(f.fits[1].is_none());
        assert_eq!(f.table.values[1], vec![None, None, None]);
    }

    #[test]
    fn forecast_window_is_validated() {
        let table = SurveyTable::new(
            vec!["A1-1".into()],
            vec![date(2020, 1, 1), date(2021, 1, 1)],
            vec![vec![Some(1.0), Some(2.0)]],
        );
        assert_matches!(
            forecast(&table, 3, 1),
            Err(AnalysisError::ForecastWindow { requested: 3, available: 2 })
        );
        assert_matches!(forecast(&table, 1, 1), Err(AnalysisError::ForecastWindow { .. }));

        let empty = SurveyTable::new(vec![], vec![], vec![]);
        assert_matches!(forecast(&empty, 2, 1), Err(AnalysisError::EmptySurvey));
    }
}
