//! Side-effect port: producer side of the post-ingestion bus.

use std::future::Future;

use coredata_domain::side_effect::SideEffect;

/// Accepts side-effect messages for asynchronous processing.
///
/// Emission cannot fail from the caller's point of view. Implementations may
/// wait for queue capacity.
pub trait SideEffectEmitter {
    fn emit(&self, effect: SideEffect) -> impl Future<Output = ()> + Send;
}

impl<T: SideEffectEmitter + Send + Sync> SideEffectEmitter for std::sync::Arc<T> {
    fn emit(&self, effect: SideEffect) -> impl Future<Output = ()> + Send {
        (**self).emit(effect)
    }
}
