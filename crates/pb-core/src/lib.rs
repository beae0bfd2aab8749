pub mod error;
pub mod id;
pub mod model;
pub mod store;

pub use error::{EditError, TreeError};
pub use id::NodeId;
pub use model::*;
pub use store::{
    create_default_node, delete, duplicate, insert_at, insert_at_root, move_node, nest_into,
    removed_ids, update_props,
};
