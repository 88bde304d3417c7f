// ABOUTME: Type-safe identifiers and validated domain names.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod trait_name;
mod type_name;

pub use id::{TargetId, TraitId};
pub(crate) use id::{next_target_id, next_trait_id};
pub use trait_name::{TraitName, TraitNameError};
pub use type_name::{TypeName, TypeNameError};
