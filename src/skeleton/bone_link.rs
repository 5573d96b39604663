//! 骨骼节点
//!
//! `Bone` 保存骨骼的固有属性（名称、父子关系、绑定姿态），
//! `BoneLink` 是骨骼集合中的存储单元：普通骨骼或摆动骨。

use glam::{Mat4, Vec3};

use super::jiggle_bone::JiggleBone;

// ============================================================================
// 骨骼
// ============================================================================

/// 骨骼（绑定姿态在导入后不再改变）
#[derive(Clone, Debug)]
pub struct Bone {
    /// 骨骼名称
    pub name: String,

    /// 骨骼内部索引（= 插入顺序）
    pub(crate) internal_id: usize,

    /// 父骨骼索引 (-1 表示根骨骼)
    pub parent_index: i32,

    /// 单位骨骼图元 → 骨骼空间
    pub to_bone_from_unit: Mat4,

    /// 骨骼空间 → 模型空间（绑定姿态）
    pub to_model_from_bone: Mat4,
}

impl Bone {
    /// 创建新骨骼，绑定矩阵为单位阵
    pub fn new(name: String, internal_id: usize, parent_index: i32) -> Self {
        Self {
            name,
            internal_id,
            parent_index,
            to_bone_from_unit: Mat4::IDENTITY,
            to_model_from_bone: Mat4::IDENTITY,
        }
    }

    /// 骨骼索引
    #[inline]
    pub fn id(&self) -> usize {
        self.internal_id
    }

    /// 父骨骼索引
    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        if self.parent_index >= 0 {
            Some(self.parent_index as usize)
        } else {
            None
        }
    }

    /// 是否为根骨骼
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }

    /// 绑定姿态下骨骼原点（模型空间）
    #[inline]
    pub fn bind_origin(&self) -> Vec3 {
        self.to_model_from_bone.w_axis.truncate()
    }

    /// 逆绑定矩阵（模型空间 → 骨骼空间）
    #[inline]
    pub fn inverse_bind_matrix(&self) -> Mat4 {
        self.to_model_from_bone.inverse()
    }
}

// ============================================================================
// 骨骼存储单元
// ============================================================================

/// 骨骼集合中的一项
#[derive(Clone, Debug)]
pub enum BoneLink {
    /// 普通骨骼，每帧更新为空操作
    Plain(Bone),
    /// 摆动骨，最终变换由物理积分得到
    Jiggle(JiggleBone),
}

impl BoneLink {
    /// 基础骨骼数据
    #[inline]
    pub fn bone(&self) -> &Bone {
        match self {
            BoneLink::Plain(bone) => bone,
            BoneLink::Jiggle(jiggle) => &jiggle.base,
        }
    }

    #[inline]
    pub fn bone_mut(&mut self) -> &mut Bone {
        match self {
            BoneLink::Plain(bone) => bone,
            BoneLink::Jiggle(jiggle) => &mut jiggle.base,
        }
    }

    #[inline]
    pub fn is_jiggle(&self) -> bool {
        matches!(self, BoneLink::Jiggle(_))
    }

    #[inline]
    pub fn as_jiggle(&self) -> Option<&JiggleBone> {
        match self {
            BoneLink::Jiggle(jiggle) => Some(jiggle),
            BoneLink::Plain(_) => None,
        }
    }

    #[inline]
    pub fn as_jiggle_mut(&mut self) -> Option<&mut JiggleBone> {
        match self {
            BoneLink::Jiggle(jiggle) => Some(jiggle),
            BoneLink::Plain(_) => None,
        }
    }

    /// 仅在物理激活时返回摆动骨
    #[inline]
    pub fn as_active_jiggle(&self) -> Option<&JiggleBone> {
        self.as_jiggle().filter(|jiggle| jiggle.is_active())
    }

    /// 物理修正矩阵（模型空间），普通骨骼为单位阵
    #[inline]
    pub fn jiggle_transform(&self) -> Mat4 {
        match self {
            BoneLink::Plain(_) => Mat4::IDENTITY,
            BoneLink::Jiggle(jiggle) => jiggle.jiggle_matrix(),
        }
    }

    // ========================================
    // 便捷方法（转发到 Bone）
    // ========================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.bone().name
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.bone().id()
    }

    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        self.bone().parent_id()
    }
}

impl From<Bone> for BoneLink {
    fn from(bone: Bone) -> Self {
        BoneLink::Plain(bone)
    }
}

impl From<JiggleBone> for BoneLink {
    fn from(jiggle: JiggleBone) -> Self {
        BoneLink::Jiggle(jiggle)
    }
}
