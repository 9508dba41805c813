pub mod api_fetch;
pub mod charts;
pub mod config;
pub mod demo_feed;
pub mod heatmap;
pub mod http_client;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod prediction;
pub mod provider;
pub mod state;
pub mod terminal_view;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod view;
