//! 动画系统
//!
//! 存储多个动画片段，按时间求值姿态，并按骨骼层级组合成模型空间矩阵。

use glam::Mat4;

use super::motion_track::{MotionTrack, Track};
use crate::skeleton::{topological_order, Skeleton};
use crate::{EngineError, Result};

/// 动画片段
#[derive(Clone, Debug)]
pub struct Animation {
    /// 动画名称
    pub name: String,
    /// 时长（秒）
    pub duration: f32,
    /// 每骨骼一条轨道（与骨骼索引平行）
    pub tracks: Vec<Track>,
    /// 是否循环，默认 true
    pub looping: bool,
}

impl Animation {
    pub fn new(name: &str, duration: f32) -> Self {
        Self {
            name: name.to_string(),
            duration,
            tracks: Vec::new(),
            looping: true,
        }
    }

    /// 播放时间 → 片段内时间
    ///
    /// 循环时对时长取模，否则截断到 `[0, duration]`；时长非正时恒为 0。
    pub fn local_time(&self, time: f32) -> f32 {
        if self.duration.is_nan() || self.duration <= 0.0 || !time.is_finite() {
            return 0.0;
        }
        if self.looping {
            time.rem_euclid(self.duration)
        } else {
            time.clamp(0.0, self.duration)
        }
    }
}

/// 动画系统
#[derive(Clone, Debug)]
pub struct AnimationSystem {
    /// 所有动画
    animations: Vec<Animation>,
    /// 当前选中的动画
    selected_animation: usize,
    /// 父骨骼索引（按骨骼索引）
    parents: Vec<Option<usize>>,
    /// 父先于子的求值顺序
    evaluation_order: Vec<usize>,
}

impl AnimationSystem {
    /// 为指定骨架创建动画系统
    ///
    /// 构建时做一次拓扑排序，层级无效时返回错误。
    pub fn new(skeleton: &Skeleton) -> Result<Self> {
        let parents = skeleton.parent_ids();
        let evaluation_order = topological_order(&parents)?;
        Ok(Self {
            animations: Vec::new(),
            selected_animation: 0,
            parents,
            evaluation_order,
        })
    }

    /// 骨骼数量
    #[inline]
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// 求值顺序
    #[inline]
    pub fn evaluation_order(&self) -> &[usize] {
        &self.evaluation_order
    }

    // ========================================
    // 构建
    // ========================================

    /// 注册动画片段，返回索引
    pub fn add_animation(&mut self, name: &str, duration: f32) -> usize {
        self.animations.push(Animation::new(name, duration));
        log::info!("[Animation] 注册动画 '{}': 时长 {:.3}s", name, duration);
        self.animations.len() - 1
    }

    /// 按帧率采样一条轨道，追加到指定动画
    ///
    /// 轨道按追加顺序对应骨骼索引；返回轨道索引。
    pub fn add_track<F>(
        &mut self,
        animation_index: usize,
        start_time: f32,
        end_time: f32,
        frame_rate: f32,
        sampler: F,
    ) -> Result<usize>
    where
        F: FnMut(f32) -> Mat4,
    {
        let track = Track::from_samples(start_time, end_time, frame_rate, sampler)?;
        self.push_track(animation_index, track)
    }

    /// 追加已构建的轨道
    pub fn push_track(&mut self, animation_index: usize, track: Track) -> Result<usize> {
        let bone_count = self.bone_count();
        let len = self.animations.len();
        let animation = self
            .animations
            .get_mut(animation_index)
            .ok_or(EngineError::OutOfRange { index: animation_index, len })?;
        if animation.tracks.len() >= bone_count {
            return Err(EngineError::InvalidConfiguration(format!(
                "animation '{}' already has a track for each of its {} bones",
                animation.name, bone_count
            )));
        }
        animation.tracks.push(track);
        Ok(animation.tracks.len() - 1)
    }

    // ========================================
    // 选择
    // ========================================

    /// 动画数量
    #[inline]
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// 当前选中的动画索引
    #[inline]
    pub fn selected_animation(&self) -> usize {
        self.selected_animation
    }

    /// 按索引获取动画
    pub fn animation(&self, index: usize) -> Result<&Animation> {
        let len = self.animations.len();
        self.animations.get(index).ok_or(EngineError::OutOfRange { index, len })
    }

    /// 按索引获取可变动画
    pub fn animation_mut(&mut self, index: usize) -> Result<&mut Animation> {
        let len = self.animations.len();
        self.animations.get_mut(index).ok_or(EngineError::OutOfRange { index, len })
    }

    /// 选择动画，越界时取模回绕，返回实际索引
    pub fn set_animation_index(&mut self, index: usize) -> Result<usize> {
        let count = self.animations.len();
        if count == 0 {
            return Err(EngineError::InvalidConfiguration(
                "no animations to select".to_string(),
            ));
        }
        self.selected_animation = index % count;
        Ok(self.selected_animation)
    }

    // ========================================
    // 求值
    // ========================================

    /// 求值当前动画在 `time` 的姿态，写入模型空间矩阵
    ///
    /// `out` 长度必须等于骨骼数；轨道数必须等于骨骼数。
    /// 有父骨骼时 out[i] = out[parent] * local[i]，按拓扑序求值。
    pub fn get_animation_data(&self, time: f32, out: &mut [Mat4]) -> Result<()> {
        let bone_count = self.bone_count();
        if out.len() != bone_count {
            return Err(EngineError::InvalidConfiguration(format!(
                "output holds {} matrices but skeleton has {} bones",
                out.len(),
                bone_count
            )));
        }
        if self.animations.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "no animations registered".to_string(),
            ));
        }
        let animation = self.animation(self.selected_animation)?;
        if animation.tracks.len() != bone_count {
            return Err(EngineError::InvalidConfiguration(format!(
                "animation '{}' has {} tracks for {} bones",
                animation.name,
                animation.tracks.len(),
                bone_count
            )));
        }

        let local_time = animation.local_time(time);
        for (slot, track) in out.iter_mut().zip(&animation.tracks) {
            *slot = track.seek(local_time);
        }

        for &id in &self.evaluation_order {
            if let Some(parent) = self.parents[id] {
                out[id] = out[parent] * out[id];
            }
        }
        Ok(())
    }
}
