pub mod walk;

pub use walk::{
    DepthOrder, DirectoryNode, Entries, Entry, FileAsset, ProductFolder, WalkFailure, Walker,
};
