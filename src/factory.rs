// ABOUTME: Sealed-type adapter - manufactures fresh targets and composes onto them.
// ABOUTME: Factories are opaque; the core never inspects what they produce.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::compose::{ComposeError, Composer};
use crate::def::TraitDef;
use crate::mro::linearize;
use crate::target::Target;
use crate::types::{TraitName, TypeName};

/// Errors raised while composing onto a freshly manufactured target.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("trait '{0}' declares no sealed base type anywhere in its resolution order")]
    NoSealedBase(TraitName),

    #[error("no factory registered for sealed type '{0}'")]
    UnknownSealedType(TypeName),

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

type FactoryFn = Arc<dyn Fn() -> Target + Send + Sync>;

/// Registry of sealed-type factories, keyed by type name.
///
/// The host environment registers one factory per sealed type it can
/// instantiate; [`compose_new`](Self::compose_new) is the entry point used
/// when no pre-existing target is available.
#[derive(Default)]
pub struct SealedRegistry {
    factories: HashMap<TypeName, FactoryFn>,
}

impl SealedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a sealed type. A later registration under the
    /// same name replaces the earlier one.
    pub fn register<F>(&mut self, type_name: TypeName, factory: F)
    where
        F: Fn() -> Target + Send + Sync + 'static,
    {
        self.factories.insert(type_name, Arc::new(factory));
    }

    pub fn is_registered(&self, type_name: &TypeName) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Produce a fresh instance of the given sealed type.
    pub fn instantiate(&self, type_name: &TypeName) -> Result<Target, FactoryError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| FactoryError::UnknownSealedType(type_name.clone()))?;

        let target = (factory.as_ref())();
        tracing::debug!(
            "instantiated sealed type '{}' as target {}",
            type_name,
            target.id()
        );
        Ok(target)
    }

    /// Manufacture a fresh target for `def`'s sealed base and compose `def`
    /// onto it, using default composition options.
    ///
    /// The sealed base is the first one declared along `def`'s resolution
    /// order, so a derived trait inherits its ancestor's base.
    pub fn compose_new(&self, def: &Arc<TraitDef>, args: &[Value]) -> Result<Target, FactoryError> {
        self.compose_new_with(&mut Composer::default(), def, args)
    }

    /// Like [`compose_new`](Self::compose_new), but through a caller-owned
    /// composer so options and conflict diagnostics carry across calls.
    pub fn compose_new_with(
        &self,
        composer: &mut Composer,
        def: &Arc<TraitDef>,
        args: &[Value],
    ) -> Result<Target, FactoryError> {
        let order = linearize(def).map_err(ComposeError::from)?;

        let base = order
            .iter()
            .find_map(|layer| layer.sealed_base())
            .ok_or_else(|| FactoryError::NoSealedBase(def.name().clone()))?;

        let target = self.instantiate(base)?;
        let composed = composer.compose(&target, def, args)?;
        Ok(composed)
    }
}

impl std::fmt::Debug for SealedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
