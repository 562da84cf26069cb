//! Search text normalization and candidate filtering.
//!
//! A search such as `"Delhi, IN"` is split into the place name sent to the
//! geocoder and an optional ISO country code used to narrow its results.

use crate::model::Place;

/// GeoNames feature codes of populated places (capitals, administrative
/// seats and plain settlements). Other features such as regions, parks or
/// mountains are dropped from the candidate list.
pub const POPULATED_PLACE_CODES: [&str; 11] = [
    "PPLC", "PPLA", "PPLA2", "PPLA3", "PPLA4", "PPL", "PPLG", "PPLL", "PPLR", "PPLS", "PPLX",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Name sent to the geocoder.
    pub name: String,
    /// Uppercased two-letter country code, if the input ended with one.
    pub country: Option<String>,
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Split an optional trailing `, XX` country code off the search text.
pub fn parse_query(text: &str) -> SearchQuery {
    let trimmed = text.trim();
    let segments: Vec<&str> = trimmed.split(',').collect();

    if let [rest @ .., last] = segments.as_slice() {
        let candidate = last.trim();
        if !rest.is_empty() && is_country_code(candidate) {
            let name = rest.join(",").trim().to_string();
            if !name.is_empty() {
                return SearchQuery {
                    name,
                    country: Some(candidate.to_ascii_uppercase()),
                };
            }
        }
    }

    SearchQuery {
        name: trimmed.to_string(),
        country: None,
    }
}

fn is_country_code(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn is_populated_place(place: &Place) -> bool {
    place
        .feature_code
        .as_deref()
        .is_some_and(|code| POPULATED_PLACE_CODES.contains(&code))
}

fn matches_country(place: &Place, country: Option<&str>) -> bool {
    match country {
        None => true,
        Some(wanted) => place
            .country_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(wanted)),
    }
}

/// Keep populated places in the requested country.
///
/// When that leaves nothing, the unfiltered list is returned instead: the
/// filter narrows results but never turns a hit into "no results".
pub fn filter_candidates(places: Vec<Place>, country: Option<&str>) -> Vec<Place> {
    let kept: Vec<Place> = places
        .iter()
        .filter(|place| is_populated_place(place) && matches_country(place, country))
        .cloned()
        .collect();

    if kept.is_empty() { places } else { kept }
}
