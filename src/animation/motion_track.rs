//! 动画轨道
//!
//! 存储单个骨骼的所有关键帧（按时间升序），并提供查找和插值功能

use glam::Mat4;

use super::keyframe::KeyFrame;
use crate::{EngineError, Result};

/// 动画轨道 trait
pub trait MotionTrack {
    type Frame;

    /// 查找最近的前后关键帧索引
    fn search_closest(&self, time: f32) -> (Option<usize>, Option<usize>);

    /// 求值指定时间
    fn seek(&self, time: f32) -> Self::Frame;

    /// 获取轨道长度
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 最后一个关键帧的时间
    fn end_time(&self) -> f32;
}

/// 骨骼动画轨道
#[derive(Clone, Debug, Default)]
pub struct Track {
    /// 关键帧（按时间升序）
    pub key_frames: Vec<KeyFrame>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按固定帧率采样
    ///
    /// 在 `[start_time, end_time]` 内每隔 `1 / frame_rate` 秒调用一次 `sampler`，
    /// 关键帧时间相对 `start_time`。
    pub fn from_samples<F>(
        start_time: f32,
        end_time: f32,
        frame_rate: f32,
        mut sampler: F,
    ) -> Result<Self>
    where
        F: FnMut(f32) -> Mat4,
    {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "frame rate must be positive, got {}",
                frame_rate
            )));
        }
        if !start_time.is_finite() || !end_time.is_finite() || end_time < start_time {
            return Err(EngineError::InvalidConfiguration(format!(
                "invalid sample range [{}, {}]",
                start_time, end_time
            )));
        }

        let span = f64::from(end_time - start_time) * f64::from(frame_rate);
        if !span.is_finite() || span >= MAX_KEY_FRAMES as f64 {
            return Err(EngineError::InvalidConfiguration(format!(
                "[{}, {}] at {} fps exceeds {} key frames",
                start_time, end_time, frame_rate, MAX_KEY_FRAMES
            )));
        }

        let key_frame_count = key_frame_count(start_time, end_time, frame_rate);
        let key_frames = (0..key_frame_count)
            .map(|i| {
                let offset = i as f32 / frame_rate;
                KeyFrame::new(offset, sampler(start_time + offset))
            })
            .collect();
        Ok(Self { key_frames })
    }

    /// 插入关键帧（保持升序，同一时间覆盖），返回被覆盖的关键帧
    pub fn insert_keyframe(&mut self, key_frame: KeyFrame) -> Option<KeyFrame> {
        let pos = self.key_frames.partition_point(|k| k.time < key_frame.time);
        match self.key_frames.get_mut(pos) {
            Some(existing) if existing.time == key_frame.time => {
                Some(std::mem::replace(existing, key_frame))
            }
            _ => {
                self.key_frames.insert(pos, key_frame);
                None
            }
        }
    }
}

impl MotionTrack for Track {
    type Frame = Mat4;

    fn search_closest(&self, time: f32) -> (Option<usize>, Option<usize>) {
        let next = self.key_frames.partition_point(|k| k.time <= time);
        let prev = next.checked_sub(1);
        let next = (next < self.key_frames.len()).then_some(next);
        (prev, next)
    }

    fn seek(&self, time: f32) -> Mat4 {
        match self.search_closest(time) {
            (Some(prev), Some(next)) => {
                let prev = &self.key_frames[prev];
                let next = &self.key_frames[next];
                let interval = next.time - prev.time;
                let coef = if interval > 0.0 {
                    ((time - prev.time) / interval).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                prev.transform.lerp(&next.transform, coef).to_matrix()
            }
            // 只有前帧或只有后帧，直接使用
            (Some(prev), None) => self.key_frames[prev].to_model_from_bone,
            (None, Some(next)) => self.key_frames[next].to_model_from_bone,
            // 无关键帧
            (None, None) => Mat4::IDENTITY,
        }
    }

    fn len(&self) -> usize {
        self.key_frames.len()
    }

    fn end_time(&self) -> f32 {
        self.key_frames.last().map(|k| k.time).unwrap_or(0.0)
    }
}

/// 单条轨道关键帧上限（约 1 小时 @ 60fps）
pub const MAX_KEY_FRAMES: usize = 1 << 18;

/// `[start, end]` 内按帧率采样的关键帧数（含两端）
fn key_frame_count(start_time: f32, end_time: f32, frame_rate: f32) -> usize {
    // 容忍浮点误差，避免 (end - start) * rate 略小于整数时少采一帧
    ((end_time - start_time) * frame_rate + 1e-4).floor() as usize + 1
}
