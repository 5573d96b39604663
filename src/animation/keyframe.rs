//! 关键帧

use glam::Mat4;

use crate::skeleton::BoneTransform;

/// 骨骼关键帧
///
/// `to_model_from_bone` 是相对父骨骼的本地变换，组合层级后才是模型空间变换。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyFrame {
    /// 时间（秒，相对动画起点）
    pub time: f32,
    /// 本地变换
    pub to_model_from_bone: Mat4,
    /// 分解后的 TRS（插值用）
    pub(crate) transform: BoneTransform,
}

impl KeyFrame {
    pub fn new(time: f32, to_model_from_bone: Mat4) -> Self {
        Self {
            time,
            to_model_from_bone,
            transform: BoneTransform::from_matrix(to_model_from_bone),
        }
    }
}
