//! Service instance contract

use crate::error::Result;
use downcast_rs::{DowncastSync, impl_downcast};
use std::sync::Arc;

/// Contract every produced service instance satisfies.
///
/// Services are stored and passed around as [`SharedService`] trait objects;
/// consumers recover the concrete type through the downcast helpers. The
/// disposal hook is optional — the default implementation releases nothing.
pub trait Service: DowncastSync {
    /// Release resources held by the service.
    ///
    /// Invoked exactly once by the container when the producing definition is
    /// removed or the container is disposed. Errors are collected and logged
    /// by the container; they never interrupt the teardown of other services.
    fn dispose(&self) -> Result<()> {
        Ok(())
    }
}

impl_downcast!(sync Service);

/// Shared handle to a live service instance
pub type SharedService = Arc<dyn Service>;
