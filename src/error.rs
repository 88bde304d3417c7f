// ABOUTME: Crate-wide error type for graft.
// ABOUTME: Aggregates the per-module errors behind a single conversion surface.

use thiserror::Error;

use crate::compose::ComposeError;
use crate::def::DefError;
use crate::dispatch::DispatchError;
use crate::factory::FactoryError;
use crate::mro::LinearizeError;

/// Any error the crate can raise, for callers that don't need to match on
/// the per-module types.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Def(#[from] DefError),

    #[error(transparent)]
    Linearize(#[from] LinearizeError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

pub type Result<T> = std::result::Result<T, Error>;
