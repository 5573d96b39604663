//! 摆动骨物理配置
//!
//! 所有参数扁平化，由所有摆动骨共享，没有逐骨覆盖。
//! UI/配置层只能在两帧之间写入；每帧由运行时读取一次快照，
//! 再以 `&PhysicsConfig` 的形式传入 `Skeleton::update`。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 物理配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    // ========== 力 ==========
    /// 重力缩放，重力 = (0, -1, 0) * gravity_scaler，默认 1.0
    pub gravity_scaler: f32,
    /// 弹簧刚度缩放，默认 20.0
    /// 增大此值让摆动骨更快回到锚点
    pub spring_scaler: f32,
    /// 阻尼缩放，默认 2.0
    /// 增大此值让摆动更快衰减
    pub damping_scaler: f32,
    /// 是否施加力，默认 true
    /// false 时冻结运动，但簿记（past_velocity / center_of_mass）照常推进
    pub force_apply: bool,

    // ========== 积分 ==========
    /// 每隔多少步对旋转矩阵做一次正交化，默认 1（0 = 关闭）
    pub orthonormalize_interval: u32,
    /// 单帧最大时间步长（秒），默认 0.1
    /// 卡顿帧的 dt 会被截断，防止积分爆炸
    pub max_time_step: f32,

    // ========== 调试 ==========
    /// 是否输出逐帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_scaler: 1.0,
            spring_scaler: 20.0,
            damping_scaler: 2.0,
            force_apply: true,

            orthonormalize_interval: 1,
            max_time_step: 0.1,

            debug_log: false,
        }
    }
}

impl PhysicsConfig {
    /// 重力向量
    #[inline]
    pub fn gravity(&self) -> glam::Vec3 {
        glam::Vec3::NEG_Y * self.gravity_scaler
    }

    /// 截断后的时间步长（负数按 0 处理）
    #[inline]
    pub fn clamp_time_step(&self, dt: f32) -> f32 {
        if !dt.is_finite() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_time_step.max(0.0))
    }
}

/// 全局配置实例
static PHYSICS_CONFIG: Lazy<RwLock<PhysicsConfig>> = Lazy::new(|| {
    RwLock::new(PhysicsConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> PhysicsConfig {
    PHYSICS_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: PhysicsConfig) {
    *PHYSICS_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 原地修改配置（UI 滑条等只改单个字段的场景）
pub fn update_config<F: FnOnce(&mut PhysicsConfig)>(f: F) {
    let mut guard = PHYSICS_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard);
}

/// 重置为默认配置
pub fn reset_config() {
    *PHYSICS_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = PhysicsConfig::default();
}
