//! Jiggle Engine - 骨骼动画 + 摆动骨物理运行时
//!
//! 每帧流程：
//! 1. AnimationSystem 求值关键帧姿态
//! 2. Skeleton 两阶段更新（先积分所有摆动骨，再提交变换）
//! 3. AnimatedModel 合成蒙皮矩阵，交给 GPU 上传层

pub mod animation;
pub mod model;
pub mod physics;
pub mod skeleton;

pub use animation::{Animation, AnimationSystem, KeyFrame, Track};
pub use model::{AnimatedModel, BonePalette, ImportedBone, ImportedClip};
pub use physics::{PhysicsConfig, RigidState};
pub use skeleton::{Bone, BoneLink, JiggleBone, Skeleton};

use thiserror::Error;

/// 引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    /// 按名称查找骨骼失败
    #[error("bone not found: {0}")]
    NotFound(String),

    /// 索引越界
    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    /// 配置无效（零动画、轨道数不匹配、帧率非正等）
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 骨骼层级无效（父索引越界、环）
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
