//! Concrete optical surfaces: line segments and circular arcs, each paired
//! with a [`Behavior`] (mirror, refractive interface or absorbing screen),
//! grouped into [`Composite`] surfaces and [`Scene`]s that rays can be traced through.

mod arc;
mod behavior;
mod error;
mod plane;
mod scene;
mod surface;

pub use arc::*;
pub use behavior::*;
pub use error::*;
pub use plane::*;
pub use scene::*;
pub use surface::*;

use optics::*;
use optics_json::*;
use optics_random::*;
use thiserror::Error;

fn ensure_finite(values: &[Float]) -> ConstructionResult<()> {
    if values.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(ConstructionError::NonFinite)
    }
}
