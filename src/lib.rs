pub mod actions;
pub mod cli;
pub mod command;
pub mod config;
pub mod dialog;
pub mod error;
pub mod executor;
pub mod main_lib;
pub mod render;
pub mod session;
pub mod store;
pub mod traversal;
pub mod tree;

pub use error::{Result, TreeError};
pub use store::TreeStore;
pub use tree::{DocumentTree, FileFields, FileKind, Node, NodeId};
