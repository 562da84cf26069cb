//! Search/selection state of one user session.
//!
//! Every search or fetch the session starts gets a [`RequestToken`]. Results
//! are applied only if their token is still the newest one, so a slow older
//! request can never overwrite the outcome of a newer one.

use tracing::{debug, warn};

use crate::{
    error::NetworkError,
    model::{CurrentConditions, Place, UnitSystem},
    query,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Searching,
    BrowsingResults,
    FetchingConditions,
    ShowingConditions,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SearchSubmitted,
    ResultsArrived,
    PlaceSelected,
    UnitsChanged,
    ConditionsArrived,
    RequestFailed,
}

impl SessionState {
    /// Transition table. `None` means the event is not valid in this state.
    pub fn next(self, event: Event) -> Option<SessionState> {
        use Event::*;
        use SessionState::*;

        match (self, event) {
            (_, SearchSubmitted) => Some(Searching),
            (Searching, ResultsArrived) => Some(BrowsingResults),
            (BrowsingResults | FetchingConditions | ShowingConditions | Error, PlaceSelected) => {
                Some(FetchingConditions)
            }
            (FetchingConditions | ShowingConditions, UnitsChanged) => Some(FetchingConditions),
            (FetchingConditions, ConditionsArrived) => Some(ShowingConditions),
            (Searching | FetchingConditions, RequestFailed) => Some(Error),
            _ => None,
        }
    }
}

/// Generation number of a started request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// A conditions fetch the caller should run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub place: Place,
    pub units: UnitSystem,
}

/// The selected place and, once fetched, its conditions. Set and cleared as one.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub place: Place,
    pub conditions: Option<CurrentConditions>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    units: UnitSystem,
    results: Option<Vec<Place>>,
    selection: Option<Selection>,
    error: Option<String>,
    generation: u64,
}

impl Session {
    pub fn new(units: UnitSystem) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// `None` before any search completed; `Some(&[])` after a search that found nothing.
    pub fn results(&self) -> Option<&[Place]> {
        self.results.as_deref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_place(&self) -> Option<&Place> {
        self.selection.as_ref().map(|s| &s.place)
    }

    pub fn conditions(&self) -> Option<&CurrentConditions> {
        self.selection.as_ref().and_then(|s| s.conditions.as_ref())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    fn advance(&mut self, event: Event) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!(from = ?self.state, to = ?next, ?event, "session transition");
                self.state = next;
                true
            }
            None => {
                warn!(state = ?self.state, ?event, "ignoring invalid session transition");
                false
            }
        }
    }

    fn issue(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    fn accept(&self, token: RequestToken, what: &str) -> bool {
        if self.is_current(token) {
            true
        } else {
            debug!(?token, current = self.generation, "discarding stale {what} result");
            false
        }
    }

    /// Start a search. Blank text is a no-op and returns `None`.
    ///
    /// Starting a search clears the candidate list, the selection and any error.
    pub fn begin_search(&mut self, text: &str) -> Option<RequestToken> {
        if query::is_blank(text) {
            return None;
        }

        self.advance(Event::SearchSubmitted);
        self.results = None;
        self.selection = None;
        self.error = None;
        Some(self.issue())
    }

    /// Apply a search outcome. Returns `false` if the result was stale.
    pub fn finish_search(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<Place>, NetworkError>,
    ) -> bool {
        if !self.accept(token, "search") {
            return false;
        }

        match outcome {
            Ok(places) => {
                self.advance(Event::ResultsArrived);
                self.results = Some(places);
            }
            Err(e) => {
                self.advance(Event::RequestFailed);
                self.results = Some(Vec::new());
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Select the candidate at `index` and start fetching its conditions.
    pub fn select(&mut self, index: usize) -> Option<FetchRequest> {
        let place = self.results.as_ref()?.get(index)?.clone();

        if !self.advance(Event::PlaceSelected) {
            return None;
        }

        self.error = None;
        self.selection = Some(Selection {
            place: place.clone(),
            conditions: None,
        });

        Some(FetchRequest {
            token: self.issue(),
            place,
            units: self.units,
        })
    }

    /// Change the unit system. If a place is selected, its conditions are
    /// dropped and a re-fetch is requested.
    pub fn set_units(&mut self, units: UnitSystem) -> Option<FetchRequest> {
        if units == self.units {
            return None;
        }
        self.units = units;

        let place = self.selected_place()?.clone();
        if !self.advance(Event::UnitsChanged) {
            return None;
        }

        if let Some(selection) = self.selection.as_mut() {
            selection.conditions = None;
        }

        Some(FetchRequest {
            token: self.issue(),
            place,
            units,
        })
    }

    /// Apply a fetch outcome. Returns `false` if the result was stale.
    ///
    /// On failure the selection is cleared together with its conditions.
    pub fn finish_fetch(
        &mut self,
        token: RequestToken,
        outcome: Result<CurrentConditions, NetworkError>,
    ) -> bool {
        if !self.accept(token, "conditions") {
            return false;
        }

        match outcome {
            Ok(conditions) => {
                self.advance(Event::ConditionsArrived);
                if let Some(selection) = self.selection.as_mut() {
                    selection.conditions = Some(conditions);
                }
            }
            Err(e) => {
                self.advance(Event::RequestFailed);
                self.selection = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }
}
