use std::{error::Error, sync::Arc};

/// Receiving side of a stream.
///
/// Every stream signals zero or more `next` calls followed by at most one
/// terminal `error` or `complete`.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
}
