//! 蒙皮矩阵缓冲
//!
//! 每骨骼一个 mat4，按骨骼索引排列，交给 GPU 上传层整块拷贝。

use glam::Mat4;

/// 蒙皮矩阵缓冲
#[derive(Clone, Debug, Default)]
pub struct BonePalette {
    matrices: Vec<Mat4>,
}

impl BonePalette {
    /// 创建单位阵填充的缓冲
    pub fn new(bone_count: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; bone_count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Mat4] {
        &mut self.matrices
    }

    /// 上传用字节视图，长度 = 骨骼数 * 64
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// 字节长度
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.matrices.len() * std::mem::size_of::<Mat4>()
    }
}
