pub mod asset_loader;
pub mod gltf;

pub use asset_loader::{AssetLoader, LoadEvent, LoadHandle, ProgressEvent};
pub use self::gltf::{load_gltf_from_slice, LoadedAsset};
