pub mod crud_base;
pub mod traits;

pub use crud_base::CrudBase;
pub use traits::{CrudResource, MergeIntoActiveModel};
