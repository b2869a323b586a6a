//! Emission intensity projections.
//!
//! Two independent projections are built per company and scope: the
//! trajectory method extrapolates the historic intensity trend, the target
//! method follows the company's stated reduction targets. Both are expressed
//! as yearly intensities over the projection window so they can be compared
//! against a benchmark intensity curve.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::interfaces::{EmissionTarget, TargetType};
use crate::series::YearSeries;

/// Historic emission intensity (emissions per unit of production).
///
/// Only years with both an emission figure and positive production are kept.
pub fn historic_intensities(emissions: &YearSeries, production: &YearSeries) -> YearSeries {
    emissions.zip_with(production, |e, p| (p > 0.0).then(|| e / p))
}

/// Project production over `years`.
///
/// Starts from the latest historic production at or before the first year of
/// the window (or the earliest observation when all history is later) and
/// compounds the yearly growth rates of `growth`. Without a growth curve the
/// production is held flat.
///
/// # Arguments
///
/// * `historic` - Historic production
/// * `growth` - Yearly growth rates, e.g. 0.02 for 2 % growth
/// * `years` - Projection window
pub fn project_production(
    historic: &YearSeries,
    growth: Option<&YearSeries>,
    years: RangeInclusive<i32>,
) -> Option<YearSeries> {
    let start_year = *years.start();
    let anchor = historic
        .latest_at_or_before(start_year)
        .or_else(|| historic.first())?;

    let mut level = anchor.value;
    let mut projected = YearSeries::new();
    for year in years {
        if year > start_year {
            let rate = growth.and_then(|g| g.value_at(year)).unwrap_or(0.0);
            level *= 1.0 + rate;
        }
        projected.insert(year, level);
    }
    Some(projected)
}

/// Compound annual trend between the earliest and latest observation.
///
/// Capped to `±max_annual_trend`; zero for a single observation or a
/// non-positive starting point.
pub fn annual_trend(intensities: &YearSeries, max_annual_trend: f64) -> f64 {
    let (Some(first), Some(last)) = (intensities.first(), intensities.last()) else {
        return 0.0;
    };
    if last.year <= first.year || first.value <= 0.0 {
        return 0.0;
    }
    let ratio = last.value / first.value;
    let trend = if ratio > 0.0 {
        ratio.powf(1.0 / f64::from(last.year - first.year)) - 1.0
    } else {
        -max_annual_trend
    };
    trend.clamp(-max_annual_trend, max_annual_trend)
}

/// Extrapolate historic intensities over `years` with their annual trend.
///
/// Years inside the historic range take the (interpolated) historic value;
/// later years compound the trend from the latest observation.
pub fn extrapolate_trajectory(
    intensities: &YearSeries,
    years: RangeInclusive<i32>,
    max_annual_trend: f64,
) -> Option<YearSeries> {
    let last = intensities.last()?;
    let trend = annual_trend(intensities, max_annual_trend);
    Some(
        years
            .map(|year| {
                let value = if year <= last.year {
                    intensities.value_at(year).unwrap_or(last.value)
                } else {
                    last.value * (1.0 + trend).powi(year - last.year)
                };
                (year, value)
            })
            .collect(),
    )
}

/// Company history needed to turn targets into intensity anchors.
#[derive(Debug, Clone, Copy)]
pub struct TargetContext<'a> {
    /// Historic emissions of the scope.
    pub emissions: &'a YearSeries,
    /// Historic intensities of the scope.
    pub intensities: &'a YearSeries,
    /// Projected production over the window.
    pub production: &'a YearSeries,
    /// Intensity at the start of the window.
    pub base_intensity: f64,
}

/// Intensity the company commits to at the target year, if computable.
pub fn target_anchor(target: &EmissionTarget, ctx: &TargetContext<'_>) -> Option<f64> {
    let remaining = 1.0 - target.reduction_ambition;
    let anchor = match target.target_type {
        TargetType::Intensity => ctx.intensities.value_at(target.base_year)? * remaining,
        TargetType::Absolute => {
            let emissions = ctx.emissions.value_at(target.base_year)?;
            let production = ctx.production.value_at(target.target_year)?;
            if production <= 0.0 {
                return None;
            }
            emissions * remaining / production
        }
    };
    anchor.is_finite().then_some(anchor)
}

/// Build a target-implied intensity pathway over `years`.
///
/// Returns the pathway together with the last target year, or `None` when no
/// target is usable. The pathway starts at the base intensity, interpolates
/// linearly between target anchors and stays flat after the last one. Two
/// targets for the same year resolve to the more ambitious anchor.
pub fn target_pathway(
    targets: &[&EmissionTarget],
    ctx: &TargetContext<'_>,
    years: RangeInclusive<i32>,
) -> Option<(YearSeries, i32)> {
    let start_year = *years.start();
    let mut anchors = YearSeries::new();
    for target in targets {
        if !target.is_usable(start_year) {
            debug!(
                scope = %target.scope,
                base_year = target.base_year,
                target_year = target.target_year,
                "skipping unusable target"
            );
            continue;
        }
        let Some(anchor) = target_anchor(target, ctx) else {
            debug!(
                scope = %target.scope,
                target_year = target.target_year,
                "target base year not covered by history"
            );
            continue;
        };
        let value = anchors
            .get(target.target_year)
            .map_or(anchor, |existing| existing.min(anchor));
        anchors.insert(target.target_year, value);
    }

    let last_year = anchors.last()?.year;
    anchors.insert(start_year, ctx.base_intensity);
    Some((anchors.resample(years), last_year))
}
