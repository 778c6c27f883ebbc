//! Element ids the widget expects on the host page.

pub const SEARCH_FORM_ID: &str = "storeSearchForm";
pub const SEARCH_INPUT_ID: &str = "storeSearchInput";
pub const RESULTS_ID: &str = "resultWrapper";
pub const SHOW_ALL_ID: &str = "showAllBtn";
pub const MAP_ID: &str = "retail-map";

/// Which of the expected elements the page actually has.
///
/// Handlers for missing elements are never wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PageElements {
    pub search_form: bool,
    pub search_input: bool,
    pub results: bool,
    pub show_all: bool,
    pub map: bool,
}

impl PageElements {
    /// Every element present.
    #[must_use]
    pub fn all() -> Self {
        Self {
            search_form: true,
            search_input: true,
            results: true,
            show_all: true,
            map: true,
        }
    }

    /// Presence from the ids found on the page.
    pub fn from_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut page = Self {
            search_form: false,
            search_input: false,
            results: false,
            show_all: false,
            map: false,
        };
        for id in ids {
            match id {
                SEARCH_FORM_ID => page.search_form = true,
                SEARCH_INPUT_ID => page.search_input = true,
                RESULTS_ID => page.results = true,
                SHOW_ALL_ID => page.show_all = true,
                MAP_ID => page.map = true,
                other => tracing::trace!(id = other, "ignoring unrelated page element"),
            }
        }
        for (present, id) in [
            (page.search_form, SEARCH_FORM_ID),
            (page.search_input, SEARCH_INPUT_ID),
            (page.results, RESULTS_ID),
            (page.show_all, SHOW_ALL_ID),
            (page.map, MAP_ID),
        ] {
            if !present {
                tracing::debug!(id, "page element missing; related handlers not wired");
            }
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ids_marks_present_elements() {
        let page = PageElements::from_ids([SEARCH_FORM_ID, RESULTS_ID, "footer"]);
        assert!(page.search_form);
        assert!(page.results);
        assert!(!page.search_input);
        assert!(!page.show_all);
        assert!(!page.map);
    }

    #[test]
    fn from_ids_with_everything_equals_all() {
        let page =
            PageElements::from_ids([SEARCH_FORM_ID, SEARCH_INPUT_ID, RESULTS_ID, SHOW_ALL_ID, MAP_ID]);
        assert_eq!(page, PageElements::all());
    }
}
