//! 动画系统
//!
//! - keyframe: 关键帧（时间 + 本地变换）
//! - motion_track: 单骨骼轨道与插值
//! - animation_system: 动画片段管理与层级组合

mod animation_system;
mod keyframe;
mod motion_track;

pub use animation_system::{Animation, AnimationSystem};
pub use keyframe::KeyFrame;
pub use motion_track::{MotionTrack, Track};
