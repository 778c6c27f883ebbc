//! Markup for the results panel and map popups.
//!
//! Everything is built with `maud`, which escapes interpolated text, so
//! retailer names and addresses from the GeoJSON can never inject markup.

use maud::{html, Markup};

use retailmap_core::RetailerFeature;

pub const MSG_PROMPT: &str = "Type a city or zip code...";
pub const MSG_SEARCHING: &str = "Searching...";
pub const MSG_NO_RESULTS: &str = "No results found.";
pub const MSG_FAILED: &str = "Something went wrong. Try again.";

/// A status line shown in place of the result list.
#[must_use]
pub fn render_message(message: &str) -> Markup {
    html! {
        div."no-results" { (message) }
    }
}

/// One row per feature; rows carry their index so a click can be mapped back
/// to the feature. An empty slice renders the "no results" message.
#[must_use]
pub fn render_results(features: &[RetailerFeature]) -> Markup {
    if features.is_empty() {
        return render_message(MSG_NO_RESULTS);
    }

    html! {
        @for (idx, feature) in features.iter().enumerate() {
            div."retailer-item" data-idx=(idx) {
                div."retailer-item__title" { (feature.display_name()) }
                div."retailer-item__address" { (feature.address()) }
                @if let Some(distance) = feature.distance_mi {
                    div."retailer-item__meta" { (format_distance(distance)) }
                }
                @if let Some(url) = feature.directions_url() {
                    a."retailer-item__link" href=(url) target="_blank" rel="noopener" { "Directions" }
                }
            }
        }
    }
}

#[must_use]
pub fn render_popup(feature: &RetailerFeature) -> Markup {
    html! {
        div."retail-popup" {
            strong { (feature.display_name()) }
            br;
            span { (feature.address()) }
            br;
            br;
            @if let Some(url) = feature.directions_url() {
                a."popup-link" href=(url) target="_blank" rel="noopener" { "Directions" }
            }
        }
    }
}

/// `6.93` → `"6.9 mi"`.
#[must_use]
pub fn format_distance(miles: f64) -> String {
    format!("{miles:.1} mi")
}
