use once_cell::sync::Lazy;
use tokio::runtime::{self, Handle, RuntimeFlavor};

static RUNTIME: Lazy<Option<runtime::Runtime>> = Lazy::new(|| {
    runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("nexus-secrets-rt")
        .build()
        .map_err(|err| tracing::error!(error = %err, "failed to build nexus-secrets runtime"))
        .ok()
});

/// Run a future to completion from synchronous code without nesting runtimes.
///
/// Returns `None` only when no runtime could be used: the shared runtime
/// failed to build, or the caller sits on a current-thread runtime where
/// blocking would deadlock.
pub(crate) fn sync_await<F>(fut: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            tracing::error!("blocking resolution called from a current-thread runtime");
            return None;
        }
        return Some(tokio::task::block_in_place(|| handle.block_on(fut)));
    }
    RUNTIME.as_ref().map(|rt| rt.block_on(fut))
}
