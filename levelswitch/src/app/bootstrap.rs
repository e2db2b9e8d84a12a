//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::loader::{HttpMapLoadClient, LoadResult, MapLoadClient};
use crate::switch::{SwitchController, SwitchDaemon, SwitchHandle};
use crate::telemetry::SwitchMetrics;

/// Running switcher: a spawned daemon plus the handles to talk to it.
pub struct LevelSwitchApp {
    handle: SwitchHandle,
    metrics: Arc<SwitchMetrics>,
    shutdown: CancellationToken,
    daemon_task: JoinHandle<SwitchController>,
}

impl LevelSwitchApp {
    /// Start the switcher against the HTTP map server in `config`.
    ///
    /// Cancelling `shutdown` aborts the availability wait and later stops
    /// the daemon.
    pub async fn start(config: AppConfig, shutdown: CancellationToken) -> Result<Self, AppError> {
        let client =
            HttpMapLoadClient::with_timeout(config.map_server.url.clone(), config.map_server.timeout)?;
        Self::start_with_client(config, Arc::new(client), shutdown).await
    }

    /// Start the switcher with a caller-supplied map-load client.
    pub async fn start_with_client(
        config: AppConfig,
        client: Arc<dyn MapLoadClient>,
        shutdown: CancellationToken,
    ) -> Result<Self, AppError> {
        info!(
            server = %config.map_server.url,
            levels = config.levels.len(),
            default_level = %config.default_level,
            "Starting level switcher"
        );

        if !config.levels.contains(&config.default_level) {
            warn!(
                default_level = %config.default_level,
                "Default level has no configured map"
            );
        }

        if config.map_server.wait_for_service {
            if !client.wait_until_available(shutdown.clone()).await {
                return Err(AppError::Cancelled);
            }
            info!("Service available.");
        }

        let controller = SwitchController::new(config.levels, config.default_level);
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) =
            SwitchDaemon::new(config.daemon, controller, client, Arc::clone(&metrics));

        let daemon_task = tokio::spawn(daemon.run(shutdown.clone()));

        Ok(Self {
            handle,
            metrics,
            shutdown,
            daemon_task,
        })
    }

    /// Producer handle for feeding snapshots to the daemon.
    pub fn handle(&self) -> SwitchHandle {
        self.handle.clone()
    }

    pub fn metrics(&self) -> Arc<SwitchMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wait for the daemon to drain.
    ///
    /// Drops the app's own handle; the daemon stops once every other handle
    /// is gone and the outstanding load (if any) has completed, or when the
    /// shutdown token fires.
    pub async fn wait(self) -> Result<SwitchController, AppError> {
        drop(self.handle);
        let controller = self.daemon_task.await?;
        info!("Level switcher stopped");
        Ok(controller)
    }

    /// Stop the daemon now, without waiting for an outstanding load.
    pub async fn shutdown(self) -> Result<SwitchController, AppError> {
        info!("Shutting down level switcher");
        self.shutdown.cancel();
        self.wait().await
    }
}

/// Issue a single load for `level` outside the daemon.
///
/// Used for manual switches. The level must be in the configured table.
pub async fn load_once(
    config: &AppConfig,
    client: &dyn MapLoadClient,
    level: &str,
) -> Result<LoadResult, AppError> {
    let path = config.levels.resolve(level)?;
    info!(level, path = %path, "Trying to load map");
    Ok(client.request_load(path).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetSnapshot, RobotState};
    use crate::level::{LevelMap, MapAssetPath};
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        requested: Mutex<Vec<MapAssetPath>>,
    }

    impl MapLoadClient for RecordingClient {
        fn request_load(&self, path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
            self.requested.lock().unwrap().push(path.clone());
            Box::pin(async { LoadResult::Success })
        }
    }

    struct NeverAvailable;

    impl MapLoadClient for NeverAvailable {
        fn request_load(&self, _path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
            Box::pin(async { LoadResult::Success })
        }

        fn wait_until_available(&self, shutdown: CancellationToken) -> BoxFuture<'static, bool> {
            Box::pin(async move {
                shutdown.cancelled().await;
                false
            })
        }
    }

    fn test_config() -> AppConfig {
        let levels = LevelMap::new([("L1", "maps/L1.yaml"), ("L2", "maps/L2.yaml")]).unwrap();
        AppConfig::new(levels, "L1", "http://unused")
    }

    #[tokio::test]
    async fn test_app_start_and_wait() {
        let client = Arc::new(RecordingClient::default());
        let app = LevelSwitchApp::start_with_client(
            test_config(),
            client.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let handle = app.handle();
        handle
            .submit(FleetSnapshot::new("f", vec![RobotState::new("r1", "L2")]))
            .await
            .unwrap();
        drop(handle);

        let metrics = app.metrics();
        let controller = app.wait().await.unwrap();

        assert_eq!(controller.believed_level(), "L2");
        assert_eq!(
            *client.requested.lock().unwrap(),
            vec![MapAssetPath::new("maps/L2.yaml")]
        );
        assert_eq!(metrics.snapshot().loads_succeeded, 1);
    }

    #[tokio::test]
    async fn test_app_shutdown() {
        let app = LevelSwitchApp::start_with_client(
            test_config(),
            Arc::new(RecordingClient::default()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let controller = app.shutdown().await.unwrap();
        assert_eq!(controller.believed_level(), "L1");
    }

    #[tokio::test]
    async fn test_start_cancelled_while_waiting_for_service() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let result =
            LevelSwitchApp::start_with_client(test_config(), Arc::new(NeverAvailable), shutdown)
                .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_load_once() {
        let client = RecordingClient::default();
        let config = test_config();

        let result = load_once(&config, &client, "L2").await.unwrap();
        assert_eq!(result, LoadResult::Success);

        let err = load_once(&config, &client, "L9").await.unwrap_err();
        assert!(matches!(err, AppError::LevelMap(_)));
    }
}
