//! 模型运行时
//!
//! 每帧流程：推进时间 → 求值动画姿态 → 骨架两阶段物理更新 → 合成蒙皮矩阵。
//! 整个流程同步完成后才能把蒙皮矩阵交给上传层。

use glam::Mat4;

use super::importer::{build_skeleton, register_clip, ImportedBone, ImportedClip};
use super::palette::BonePalette;
use crate::animation::AnimationSystem;
use crate::physics::{get_config, PhysicsConfig};
use crate::skeleton::Skeleton;
use crate::Result;

/// 带动画和摆动骨物理的模型
#[derive(Clone, Debug)]
pub struct AnimatedModel {
    skeleton: Skeleton,
    animation: AnimationSystem,

    /// 逆绑定矩阵（构建时计算一次）
    inverse_bind: Vec<Mat4>,
    /// 最近一次有效的模型空间姿态
    pose: Vec<Mat4>,
    /// 动画求值缓冲区（复用内存）
    eval_buf: Vec<Mat4>,
    /// 蒙皮矩阵
    palette: BonePalette,

    /// 播放时间（秒）
    time: f32,
    /// 是否播放
    playing: bool,
    /// 动画求值失败是否已经报告过（避免逐帧刷屏）
    eval_error_reported: bool,
}

impl AnimatedModel {
    /// 从骨架创建，初始姿态为绑定姿态
    pub fn new(skeleton: Skeleton) -> Result<Self> {
        let animation = AnimationSystem::new(&skeleton)?;
        let mut pose = Vec::with_capacity(skeleton.bone_count());
        skeleton.get_to_model_from_bone(&mut pose);
        let inverse_bind = pose.iter().map(Mat4::inverse).collect();
        let bone_count = skeleton.bone_count();

        Ok(Self {
            skeleton,
            animation,
            inverse_bind,
            eval_buf: pose.clone(),
            pose,
            palette: BonePalette::new(bone_count),
            time: 0.0,
            playing: true,
            eval_error_reported: false,
        })
    }

    /// 从导入数据创建
    pub fn from_import(bones: &[ImportedBone], clips: &[ImportedClip]) -> Result<Self> {
        let skeleton = build_skeleton(bones)?;
        let mut model = Self::new(skeleton)?;
        for clip in clips {
            register_clip(&mut model.animation, clip)?;
        }
        Ok(model)
    }

    // ========================================
    // 访问器
    // ========================================

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// 切换单根摆动骨的物理
    pub fn set_jiggle_enabled(&mut self, id: usize, enabled: bool) -> Result<()> {
        self.skeleton.set_jiggle_enabled(id, enabled)
    }

    /// 切换所有摆动骨的物理，返回摆动骨数量
    pub fn set_all_jiggle_enabled(&mut self, enabled: bool) -> usize {
        self.skeleton.set_all_jiggle_enabled(enabled)
    }

    #[inline]
    pub fn animation(&self) -> &AnimationSystem {
        &self.animation
    }

    #[inline]
    pub fn animation_mut(&mut self) -> &mut AnimationSystem {
        &mut self.animation
    }

    /// 选择动画并从头播放
    pub fn select_animation(&mut self, index: usize) -> Result<usize> {
        let selected = self.animation.set_animation_index(index)?;
        self.time = 0.0;
        self.eval_error_reported = false;
        Ok(selected)
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        if time.is_finite() {
            self.time = time;
        }
    }

    #[inline]
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// 最近一次有效姿态（模型空间）
    #[inline]
    pub fn pose(&self) -> &[Mat4] {
        &self.pose
    }

    /// 蒙皮矩阵
    #[inline]
    pub fn palette(&self) -> &BonePalette {
        &self.palette
    }

    // ========================================
    // 每帧更新
    // ========================================

    /// 使用全局物理配置推进一帧
    pub fn tick(&mut self, dt: f32) {
        let config = get_config();
        self.tick_with_config(dt, &config);
    }

    /// 使用指定物理配置推进一帧
    pub fn tick_with_config(&mut self, dt: f32, config: &PhysicsConfig) {
        if self.playing && dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }

        self.evaluate_pose();
        self.skeleton.update(dt, config);
        self.compose_palette();
    }

    /// 求值动画；失败或出现非有限值时对应骨骼保持上一帧姿态
    fn evaluate_pose(&mut self) {
        if self.animation.animation_count() == 0 {
            return;
        }
        match self.animation.get_animation_data(self.time, &mut self.eval_buf) {
            Ok(()) => {
                self.eval_error_reported = false;
                for (id, (pose, sampled)) in self.pose.iter_mut().zip(&self.eval_buf).enumerate() {
                    if sampled.is_finite() {
                        *pose = *sampled;
                    } else {
                        log::warn!("[Animation] 骨骼 {} 姿态非有限，保持上一帧", id);
                    }
                }
            }
            Err(e) => {
                if !self.eval_error_reported {
                    log::warn!("[Animation] 动画求值失败，保持上一帧姿态: {}", e);
                    self.eval_error_reported = true;
                }
            }
        }
    }

    /// palette[i] = pose[i] * inverse_bind[i] * jiggle[i]
    ///
    /// 物理修正在绑定空间中施加，然后再蒙皮。
    fn compose_palette(&mut self) {
        let slots = self.palette.as_mut_slice().iter_mut();
        let inputs = self.pose.iter().zip(&self.inverse_bind).zip(self.skeleton.bones());
        for (slot, ((pose, inverse_bind), bone)) in slots.zip(inputs) {
            let matrix = *pose * *inverse_bind * bone.jiggle_transform();
            if matrix.is_finite() {
                *slot = matrix;
            } else {
                log::warn!("[Skin] 骨骼 '{}' 蒙皮矩阵非有限，保持上一帧", bone.name());
            }
        }
    }
}
