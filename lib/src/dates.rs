//! ISO date literals turned into ages, with NaN standing in for unknown values.

use crate::graph::Graph;
use crate::node::Node;
use chrono::NaiveDate;
use log::warn;
use oxigraph::model::NamedNode;
use std::cmp::Ordering;

const DAYS_PER_YEAR: f64 = 365.25;

/// Age in fractional years between `iso_date` (`YYYY-MM-DD`) and `today`.
///
/// Returns `NaN` when the date cannot be parsed.
pub fn age_in_years(iso_date: &str, today: NaiveDate) -> f64 {
    match NaiveDate::parse_from_str(iso_date.trim(), "%Y-%m-%d") {
        Ok(born) => (today - born).num_days() as f64 / DAYS_PER_YEAR,
        Err(e) => {
            warn!("Could not parse date '{}': {}", iso_date, e);
            f64::NAN
        }
    }
}

/// Total order on ages: numbers ascending, NaN after every number.
pub fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Pairs each resource with its age from `birth_predicate` and sorts them
/// youngest first, unknown ages last.
///
/// A resource with no birth date, several birth dates or an unparsable one
/// gets `NaN`. The sort is stable.
pub fn resources_by_age(
    graph: &Graph,
    resources: &[Node],
    birth_predicate: &NamedNode,
    today: NaiveDate,
) -> Vec<(Node, f64)> {
    let mut aged: Vec<(Node, f64)> = resources
        .iter()
        .map(|resource| {
            let age = match graph.single_object(resource, birth_predicate) {
                Ok(date) => age_in_years(date.lexical_form(), today),
                Err(e) => {
                    warn!("{}", e);
                    f64::NAN
                }
            };
            (resource.clone(), age)
        })
        .collect();
    aged.sort_by(|a, b| cmp_nan_last(a.1, b.1));
    aged
}
