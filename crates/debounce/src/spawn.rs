use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

/// Returns the ambient runtime handle, falling back to a process-wide runtime.
///
/// UI threads that schedule searches are often not tokio worker threads.
fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_time()
			.worker_threads(1)
			.thread_name("starlog-debounce")
			.build()
			.expect("failed to build starlog-debounce fallback tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns a debounce task on the ambient or fallback runtime.
pub(crate) fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	runtime_handle().spawn(fut)
}
