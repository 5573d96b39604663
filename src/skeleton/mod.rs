//! 骨骼系统
//!
//! 核心设计思想：
//! - Bone: 骨骼固有数据（名称、父索引、绑定姿态）
//! - BoneLink: 骨骼集合中的存储单元，普通骨骼或摆动骨（按标签分派）
//! - JiggleBone: 由弹簧-阻尼物理驱动的摆动骨
//! - BoneSet: 管理骨骼层次结构和两阶段物理更新

mod bone_link;
mod bone_set;
mod jiggle_bone;

pub use bone_link::{Bone, BoneLink};
pub use bone_set::BoneSet;
pub use jiggle_bone::{JiggleBone, JiggleForces};

pub(crate) use bone_set::topological_order;

use glam::{Mat4, Quat, Vec3};

// ============================================================================
// 公共类型定义
// ============================================================================

/// 骨骼变换数据
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    /// 转换为 4x4 矩阵
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// 从矩阵分解
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }

    /// 插值：平移/缩放线性，旋转球面
    #[inline]
    pub fn lerp(&self, other: &Self, amount: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, amount),
            rotation: self.rotation.slerp(other.rotation, amount),
            scale: self.scale.lerp(other.scale, amount),
        }
    }
}

// ============================================================================
// 类型别名
// ============================================================================

/// Skeleton 别名
pub type Skeleton = BoneSet;
