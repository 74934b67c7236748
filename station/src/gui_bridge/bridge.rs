use crate::gui_bridge::model::DisplayModel;
use anyhow::Context;
use radarcore::telemetry::MetricsRecorder;
use radarcore::{DisplaySink, DisplayUpdate};
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

/// Display sink that keeps a shared snapshot and serves it over HTTP.
#[derive(Clone)]
pub struct GuiBridge {
    state: Arc<RwLock<DisplayModel>>,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DisplayModel::default())),
        }
    }

    /// Binds the HTTP endpoint and serves it on its own thread; returns the
    /// bound address.
    ///
    /// `GET /snapshot` returns the display model, `GET /metrics` the session counters.
    pub fn serve(
        &self,
        address: SocketAddr,
        metrics: Arc<MetricsRecorder>,
    ) -> anyhow::Result<SocketAddr> {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let metrics_filter = warp::any().map(move || metrics.clone());

        let snapshot_route = warp::path("snapshot")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<DisplayModel>>| match state.read() {
                Ok(model) => warp::reply::json(&*model),
                Err(poisoned) => warp::reply::json(&*poisoned.into_inner()),
            });

        let metrics_route = warp::path("metrics")
            .and(warp::get())
            .and(metrics_filter)
            .map(|metrics: Arc<MetricsRecorder>| warp::reply::json(&metrics.snapshot()));

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for display bridge")?;

        // Bind inside the runtime so the listener registers with its reactor.
        let (bound, server) = {
            let _guard = runtime.enter();
            warp::serve(snapshot_route.or(metrics_route))
                .try_bind_ephemeral(address)
                .with_context(|| format!("binding display bridge on {}", address))?
        };

        thread::Builder::new()
            .name("display-bridge".into())
            .spawn(move || runtime.block_on(server))
            .context("spawning display bridge thread")?;

        println!("[GUI] display bridge on http://{}/snapshot", bound);
        Ok(bound)
    }

    pub fn snapshot(&self) -> DisplayModel {
        match self.state.read() {
            Ok(model) => model.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for GuiBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for GuiBridge {
    fn apply(&mut self, update: DisplayUpdate) {
        if let DisplayUpdate::Notice(notice) = &update {
            println!("[GUI] {}: {}", notice.title, notice.message);
        }
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.apply(update);
    }
}
