//! Itinerary ranking: preference bounds and utility strategies.

use crate::Itinerary;

/// An entity's journey preferences.  The bounds normalise each utility term.
#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    /// Acceptable travel time, seconds.
    pub tmax: f64,
    /// Acceptable cost.
    pub cmax: f64,
    /// Acceptable walking distance, metres.
    pub wmax: f64,

    pub duration_weight: f64,
    pub cost_weight:     f64,
    pub walk_weight:     f64,
    pub transfer_weight: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tmax: 1500.0,
            cmax: 2.5,
            wmax: 1000.0,
            duration_weight: 1.0,
            cost_weight:     1.0,
            walk_weight:     1.0,
            transfer_weight: 0.5,
        }
    }
}

impl Preferences {
    /// Recompute `tmax` and `cmax` from the candidates: `1.2 × longest
    /// duration` and the cheapest cost.  Taxi and experimental alternatives
    /// are ignored; if none remain the bounds are left unchanged.
    pub fn update_bounds(&mut self, candidates: &[Itinerary]) {
        let mut max_duration: Option<f64> = None;
        let mut min_cost: Option<f64> = None;
        for it in candidates.iter().filter(|it| !it.excluded_from_bounds()) {
            max_duration = Some(max_duration.map_or(it.duration_secs, |d| d.max(it.duration_secs)));
            min_cost = Some(min_cost.map_or(it.cost, |c| c.min(it.cost)));
        }
        if let (Some(d), Some(c)) = (max_duration, min_cost) {
            self.tmax = 1.2 * d;
            self.cmax = c;
        }
    }
}

/// Orders itinerary alternatives from most to least preferred.
pub trait UtilityStrategy: Send + Sync {
    fn rank(&self, prefs: &Preferences, candidates: Vec<Itinerary>) -> Vec<Itinerary>;
}

/// Weighted sum of normalised duration, cost, walking distance and
/// transfers.  Higher utility is better.
#[derive(Copy, Clone, Debug, Default)]
pub struct WeightedUtility;

/// `value / bound`, or 0 when the bound is not positive.
#[inline]
fn normalised(value: f64, bound: f64) -> f64 {
    if bound > 0.0 { value / bound } else { 0.0 }
}

impl WeightedUtility {
    pub fn utility(&self, prefs: &Preferences, it: &Itinerary) -> f64 {
        -(prefs.duration_weight * normalised(it.duration_secs, prefs.tmax)
            + prefs.cost_weight * normalised(it.cost, prefs.cmax)
            + prefs.walk_weight * normalised(it.walk_distance_m, prefs.wmax)
            + prefs.transfer_weight * it.transfers as f64)
    }
}

impl UtilityStrategy for WeightedUtility {
    /// Descending utility; ties by `req_number`, then input order.
    fn rank(&self, prefs: &Preferences, candidates: Vec<Itinerary>) -> Vec<Itinerary> {
        let mut scored: Vec<(f64, Itinerary)> = candidates
            .into_iter()
            .map(|it| (self.utility(prefs, &it), it))
            .collect();
        scored.sort_by(|(ua, a), (ub, b)| {
            ub.total_cmp(ua).then_with(|| a.req_number.cmp(&b.req_number))
        });
        scored.into_iter().map(|(_, it)| it).collect()
    }
}
