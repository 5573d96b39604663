//! 模型运行时管理

mod importer;
mod palette;
mod runtime;

pub use importer::{build_skeleton, register_clip, ImportedBone, ImportedClip};
pub use palette::BonePalette;
pub use runtime::AnimatedModel;
