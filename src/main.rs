#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use saferoute::analyzer::RouteAnalyzer;
use saferoute::api::{self, AppState};
use saferoute::config::{Args, Settings};
use saferoute::hazards::{HazardStore, InMemoryHazardStore};
use saferoute::planner::{Collaborators, RoutePlanner};
use saferoute::providers::geoapify::GeoapifyRouter;
use saferoute::providers::http_client;
use saferoute::providers::open_meteo::OpenMeteoWeather;
use saferoute::providers::photon::PhotonGeocoder;
use saferoute::proximity::ProximityMatcher;
use saferoute::risk::fallback::FallbackModel;
use saferoute::risk::heuristic::LocalHeuristic;
use saferoute::risk::remote::RemoteModel;
use saferoute::scorer::RiskScorer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    // 1. Load tuning
    let settings = Settings::load(args.config.as_deref())?;

    // 2. Risk model: remote with local fallback, or local only
    let scorer = match &args.risk_model_url {
        Some(url) => {
            log::info!("Using remote risk model at {url}");
            let remote = RemoteModel::new(url.clone(), &settings.remote_model)
                .context("Failed to build risk model client")?;
            let local = LocalHeuristic::new(settings.scoring.clone());
            RiskScorer::with_model(settings.scoring.clone(), Arc::new(FallbackModel::new(remote, local)))
        }
        None => {
            log::info!("ML_API_URL not set, scoring with local heuristic only");
            RiskScorer::local(settings.scoring.clone())
        }
    };

    // 3. Upstream providers
    let providers = &settings.providers;
    let client = http_client(providers.timeout()).context("Failed to build HTTP client")?;
    if args.geoapify_api_key.is_none() {
        log::warn!("GEOAPIFY_API_KEY not set, route requests will fail");
    }

    let hazards: Arc<dyn HazardStore> = Arc::new(InMemoryHazardStore::new(&settings.hazards));
    let collaborators = Collaborators {
        geocoder: Arc::new(PhotonGeocoder::new(client.clone(), providers.photon_url.clone())),
        router: Arc::new(GeoapifyRouter::new(
            client.clone(),
            providers.geoapify_routing_url.clone(),
            args.geoapify_api_key.clone(),
            providers.alternatives,
        )),
        weather: Arc::new(OpenMeteoWeather::new(
            client,
            providers.open_meteo_forecast_url.clone(),
            providers.open_meteo_air_quality_url.clone(),
        )),
        hazards: hazards.clone(),
    };

    // 4. Planner
    let planner = RoutePlanner::new(
        collaborators,
        RouteAnalyzer::new(ProximityMatcher::new(&settings.matcher), scorer),
        settings.synthesis.clone(),
        settings.advisor.clone(),
    );
    let shared_state = Arc::new(AppState { planner, hazards });

    // 5. Serve
    let app = api::router(shared_state);
    let addr = format!("{}:{}", args.bind_addr, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("API Server running on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
