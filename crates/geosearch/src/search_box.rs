use foundation::time::Time;

use crate::client::{ApiError, SearchResult};
use crate::debounce::Debouncer;

/// State model behind the search input.
///
/// Typing schedules a debounced query; Enter fires immediately and the
/// caller selects the first result. Failures land in `error` as an inline
/// user-visible string; nothing here ever propagates an error upward.
#[derive(Debug, Default)]
pub struct SearchBox {
    debouncer: Debouncer,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_input(&mut self, text: &str, now: Time) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.debouncer.cancel();
        } else {
            self.debouncer.input(trimmed, now);
        }
    }

    /// The debounced query to issue, once due.
    pub fn poll(&mut self, now: Time) -> Option<String> {
        self.debouncer.poll(now)
    }

    /// Enter pressed: issue immediately, bypassing the debounce.
    pub fn on_enter(&mut self, text: &str) -> Option<String> {
        self.debouncer.cancel();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Fold a query outcome into the model. Returns the first result, the
    /// one an Enter-triggered search selects.
    pub fn apply(&mut self, outcome: Result<Vec<SearchResult>, ApiError>) -> Option<&SearchResult> {
        match outcome {
            Ok(results) => {
                self.error = None;
                self.results = results;
                if self.results.is_empty() {
                    self.error = Some("Location not found".to_string());
                }
                self.results.first()
            }
            Err(ApiError::Upstream(message)) => {
                self.results.clear();
                self.error = Some(message);
                None
            }
            Err(err) => {
                self.results.clear();
                self.error = Some(format!("Could not connect to the server: {err}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SearchBox;
    use crate::client::{ApiError, SearchResult};
    use foundation::time::Time;

    fn result(name: &str) -> SearchResult {
        SearchResult {
            name: name.into(),
            lat: 0.0,
            lon: 0.0,
            boundingbox: None,
        }
    }

    #[test]
    fn typing_is_debounced_but_enter_is_not() {
        let mut search = SearchBox::new();
        search.on_input("par", Time(0.0));
        assert_eq!(search.poll(Time(0.1)), None);

        let query = search.on_enter("paris").expect("query");
        assert_eq!(query, "paris");
        // Enter cancelled the pending debounce.
        assert_eq!(search.poll(Time(10.0)), None);
    }

    #[test]
    fn first_result_is_selected() {
        let mut search = SearchBox::new();
        let selected = search
            .apply(Ok(vec![result("Paris"), result("Paris, TX")]))
            .expect("first");
        assert_eq!(selected.name, "Paris");
        assert_eq!(search.error, None);
    }

    #[test]
    fn failures_become_inline_strings() {
        let mut search = SearchBox::new();
        assert!(search
            .apply(Err(ApiError::Upstream("Location not found".into())))
            .is_none());
        assert_eq!(search.error.as_deref(), Some("Location not found"));
        assert!(search.results.is_empty());
    }

    #[test]
    fn empty_result_set_reads_as_not_found() {
        let mut search = SearchBox::new();
        assert!(search.apply(Ok(vec![])).is_none());
        assert_eq!(search.error.as_deref(), Some("Location not found"));
    }

    #[test]
    fn blank_input_cancels_pending_queries() {
        let mut search = SearchBox::new();
        search.on_input("par", Time(0.0));
        search.on_input("   ", Time(0.1));
        assert_eq!(search.poll(Time(5.0)), None);
        assert_eq!(search.on_enter("  "), None);
    }
}
