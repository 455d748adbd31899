//! Generation plan: parsed values, loading, naming and the resolved tree.

pub mod loader;
pub mod naming;
pub mod source;
pub mod tree;
pub mod value;

pub use loader::{load_plan, RESERVED_KEYS};
pub use naming::{is_valid_name, resolve_names};
pub use source::read_plan_file;
pub use tree::{Case, CaseSource, CaseTree, Entry, Group, SourceKind};
pub use value::PlanValue;
