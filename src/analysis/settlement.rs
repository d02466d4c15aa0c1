use chrono::NaiveDate;

use crate::data::model::SurveyTable;

const INCHES_PER_FOOT: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.25;

// ---------------------------------------------------------------------------
// Cumulative settlement
// ---------------------------------------------------------------------------

/// Cumulative settlement in feet, positive downward.
///
/// Each point is measured against its own first surveyed elevation, so a
/// point added part-way through the record starts at zero on its first survey.
pub fn cumulative(elevation: &SurveyTable) -> SurveyTable {
    let values = elevation
        .values
        .iter()
        .map(|row| {
            let first = row.iter().flatten().next().copied();
            row.iter()
                .map(|v| match (first, v) {
                    (Some(f), Some(v)) => Some(f - v),
                    _ => None,
                })
                .collect()
        })
        .collect();

    SurveyTable {
        points: elevation.points.clone(),
        dates: elevation.dates.clone(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Survey-to-survey change
// ---------------------------------------------------------------------------

/// Change in settlement between consecutive surveys, in inches.
///
/// Surveys listed in `skip` are removed before differencing. The first
/// retained survey, and any survey next to a missing value, has no change.
pub fn deltas(settlement: &SurveyTable, skip: &[NaiveDate]) -> SurveyTable {
    let keep: Vec<usize> = settlement
        .dates
        .iter()
        .enumerate()
        .filter(|(_, d)| !skip.contains(d))
        .map(|(i, _)| i)
        .collect();

    let values = settlement
        .values
        .iter()
        .map(|row| {
            keep.iter()
                .enumerate()
                .map(|(k, &col)| {
                    let prev = *row.get(keep.get(k.checked_sub(1)?).copied()?)?;
                    Some((row[col]? - prev?) * INCHES_PER_FOOT)
                })
                .collect()
        })
        .collect();

    SurveyTable {
        points: settlement.points.clone(),
        dates: keep.iter().map(|&i| settlement.dates[i]).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Annualized rate
// ---------------------------------------------------------------------------

/// Settlement change annualized to inches per year.
pub fn annual_rate(deltas: &SurveyTable) -> SurveyTable {
    let years: Vec<Option<f64>> = deltas
        .dates
        .iter()
        .enumerate()
        .map(|(k, d)| {
            let prev = deltas.dates.get(k.checked_sub(1)?)?;
            let days = (*d - *prev).num_days() as f64;
            (days > 0.0).then_some(days / DAYS_PER_YEAR)
        })
        .collect();

    let values = deltas
        .values
        .iter()
        .map(|row| {
            row.iter()
                .zip(&years)
                .map(|(delta, years)| Some((*delta)? / (*years)?))
                .collect()
        })
        .collect();

    SurveyTable {
        points: deltas.points.clone(),
        dates: deltas.dates.clone(),
        values,
    }
}
