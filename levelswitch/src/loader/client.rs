//! Map-load client abstraction.

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::types::LoadResult;
use crate::level::MapAssetPath;

/// Issues load-map calls to the map server.
///
/// `request_load` returns a `'static` future so the caller can hand it to
/// another task; the future may resolve on any thread. It must always
/// resolve to exactly one [`LoadResult`], folding every transport fault
/// into [`LoadResult::TransportError`].
///
/// # Example
///
/// ```
/// use futures::future::BoxFuture;
/// use levelswitch::level::MapAssetPath;
/// use levelswitch::loader::{LoadResult, MapLoadClient};
///
/// struct AlwaysLoads;
///
/// impl MapLoadClient for AlwaysLoads {
///     fn request_load(&self, _path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
///         Box::pin(async { LoadResult::Success })
///     }
/// }
/// ```
pub trait MapLoadClient: Send + Sync + 'static {
    /// Ask the map server to load the map at `path`.
    fn request_load(&self, path: &MapAssetPath) -> BoxFuture<'static, LoadResult>;

    /// Wait until the map server is reachable.
    ///
    /// Returns `false` if `shutdown` fired first. The default implementation
    /// assumes the server is always available.
    fn wait_until_available(&self, shutdown: CancellationToken) -> BoxFuture<'static, bool> {
        let _ = shutdown;
        Box::pin(async { true })
    }
}
