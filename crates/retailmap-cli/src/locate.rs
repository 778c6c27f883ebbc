//! Command handlers driving the locator controller from the terminal.
//!
//! The map is a [`RecordingSurface`], so a run prints the same rows the
//! results panel would show and, on request, the map calls in order.

use std::io::Write;

use anyhow::Context;
use retailmap_client::{GeoJsonLoader, MapboxGeocoder};
use retailmap_core::{AppConfig, RetailerFeature};
use retailmap_widget::{
    render, CameraSettings, LocatorController, MapCommand, PageElements, RecordingSurface,
    SearchOutcome,
};

type CliController = LocatorController<RecordingSurface, MapboxGeocoder>;

async fn ready_controller(config: &AppConfig, radius: Option<f64>) -> anyhow::Result<CliController> {
    let radius_mi = match radius {
        Some(r) if r.is_finite() && r > 0.0 => r,
        Some(r) => anyhow::bail!("--radius must be a positive number of miles, got {r}"),
        None => config.search_radius_mi,
    };

    let loader = GeoJsonLoader::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build retailer loader: {e}"))?;
    let geocoder = MapboxGeocoder::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build geocoder: {e}"))?;

    let camera = CameraSettings::default();
    let mut controller = LocatorController::new(
        RecordingSurface::new(camera.initial_zoom),
        geocoder,
        PageElements::all(),
        camera,
    )
    .with_radius(radius_mi);

    tracing::debug!(url = %loader.url(), radius_mi, "loading retailer collection");
    if !controller.on_map_ready(&loader).await {
        anyhow::bail!("retailer collection could not be loaded from {}", loader.url());
    }
    Ok(controller)
}

/// Format one results row as `name | address | distance`.
pub(crate) fn format_row(feature: &RetailerFeature) -> String {
    let mut line = feature.display_name().to_owned();
    let address = feature.address();
    if !address.is_empty() {
        line.push_str(" | ");
        line.push_str(address);
    }
    if let Some(miles) = feature.distance_mi {
        line.push_str(" | ");
        line.push_str(&render::format_distance(miles));
    }
    line
}

fn print_commands(commands: &[MapCommand]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(commands).context("failed to serialize map commands")?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}

/// Run one search and print the rows the results panel would show.
///
/// # Errors
///
/// Returns an error if the clients cannot be built, the collection cannot be
/// loaded, or the search fails outright.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    radius: Option<f64>,
    show_commands: bool,
) -> anyhow::Result<()> {
    let mut controller = ready_controller(config, radius).await?;
    controller.map_mut().surface_mut().take_commands();

    controller.set_input(query);
    match controller.submit().await {
        SearchOutcome::Found { origin, count } => {
            println!(
                "{count} retailer(s) within {} mi of {}",
                controller.radius_mi(),
                origin.label
            );
            for feature in controller.rows() {
                println!("  {}", format_row(feature));
            }
        }
        SearchOutcome::Prompted => anyhow::bail!("type a city or zip code"),
        SearchOutcome::NoMatch => println!("{}", render::MSG_NO_RESULTS),
        SearchOutcome::Failed => anyhow::bail!("search for '{query}' failed; see logs"),
        SearchOutcome::Ignored | SearchOutcome::Stale => {}
    }

    if show_commands {
        print_commands(&controller.map_mut().surface_mut().take_commands())?;
    }
    Ok(())
}

/// Print every retailer in the collection.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded.
pub(crate) async fn run_list(config: &AppConfig) -> anyhow::Result<()> {
    let controller = ready_controller(config, None).await?;
    let Some(collection) = controller.collection() else {
        return Ok(());
    };
    println!("{} retailer(s)", collection.len());
    for feature in collection.features() {
        println!("  {}", format_row(feature));
    }
    Ok(())
}
