//! 摆动骨
//!
//! 状态机：
//! - 静止（物理关闭）：物理修正矩阵保持不变，初始为单位阵
//! - 激活：每帧由父/子骨骼的弹簧-阻尼耦合力积分
//!
//! 静止 → 激活 会从附着顶点重新初始化刚体状态；
//! 激活 → 静止 只翻转标志，变换冻结在最后一次提交的值。
//!
//! 受力模型（每帧）：
//! - A 端（锚点，连接父骨骼）：半重力 + 弹簧 + 阻尼
//! - B 端（远端，连接子骨骼）：半重力 + 与子骨骼对称的弹簧 + 阻尼
//! - 合力 = F_A + F_B，力矩 = r_B × F_B + r_A × F_A（r 相对当前质心）

use glam::{Mat4, Vec3};

use super::bone_link::Bone;
use crate::physics::{PhysicsConfig, RigidState};

/// 一帧内作用在摆动骨上的合力/力矩
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JiggleForces {
    pub force: Vec3,
    pub torque: Vec3,
}

/// 摆动骨
#[derive(Clone, Debug)]
pub struct JiggleBone {
    /// 基础骨骼数据
    pub base: Bone,

    /// 物理是否激活
    is_update_jiggle_physics: bool,

    /// 物理平移（提交后的结果）
    pub custom_physics_translation: Mat4,

    /// 物理旋转（提交后的结果）
    pub custom_physics_rotation: Mat4,

    /// 刚体状态
    pub physics: RigidState,

    /// 子摆动骨索引（叶节点为 None）
    pub(crate) child: Option<usize>,

    /// 绑定姿态下的远端点（模型空间）
    pub(crate) end_point: Vec3,
}

impl JiggleBone {
    /// 创建摆动骨（物理默认关闭）
    pub fn new(base: Bone, vertices: Vec<Vec3>) -> Self {
        let physics = RigidState::new(vertices);
        let end_point = reflect_through(base.bind_origin(), physics.init_center_of_mass);
        Self {
            base,
            is_update_jiggle_physics: false,
            custom_physics_translation: Mat4::IDENTITY,
            custom_physics_rotation: Mat4::IDENTITY,
            physics,
            child: None,
            end_point,
        }
    }

    // ========================================
    // 状态切换
    // ========================================

    /// 物理是否激活
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_update_jiggle_physics
    }

    /// 切换物理
    ///
    /// 从关闭切到开启时重置刚体状态和物理修正矩阵。
    pub fn set_active(&mut self, enabled: bool) {
        if enabled && !self.is_update_jiggle_physics {
            self.physics.initialize();
            self.custom_physics_translation = Mat4::IDENTITY;
            self.custom_physics_rotation = Mat4::IDENTITY;
        }
        self.is_update_jiggle_physics = enabled;
    }

    /// 子摆动骨索引
    #[inline]
    pub fn child_id(&self) -> Option<usize> {
        self.child
    }

    // ========================================
    // 端点
    // ========================================

    /// 绑定姿态下的锚点（骨骼原点）
    #[inline]
    pub fn initial_point_a(&self) -> Vec3 {
        self.base.bind_origin()
    }

    /// 绑定姿态下的远端点
    #[inline]
    pub fn initial_point_b(&self) -> Vec3 {
        self.end_point
    }

    /// 当前锚点
    #[inline]
    pub fn dynamic_point_a(&self) -> Vec3 {
        self.dynamic_point(self.initial_point_a())
    }

    /// 当前远端点
    #[inline]
    pub fn dynamic_point_b(&self) -> Vec3 {
        self.dynamic_point(self.end_point)
    }

    /// 将绑定姿态下的点按已提交的物理变换移动
    ///
    /// T * translate(c) * R * translate(-c) * p，c 为初始质心。
    /// 只作用一层，父链的运动已经通过弹簧耦合体现在本骨骼的刚体状态中。
    #[inline]
    pub fn dynamic_point(&self, point: Vec3) -> Vec3 {
        self.jiggle_matrix().transform_point3(point)
    }

    /// 物理修正矩阵（模型空间）
    pub fn jiggle_matrix(&self) -> Mat4 {
        let pivot = self.physics.init_center_of_mass;
        self.custom_physics_translation
            * Mat4::from_translation(pivot)
            * self.custom_physics_rotation
            * Mat4::from_translation(-pivot)
    }

    /// 当前线速度
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.physics.linear_velocity
    }

    // ========================================
    // 物理
    // ========================================

    /// 计算耦合力
    ///
    /// `parent`/`child` 仅在对方是激活的摆动骨时传入；
    /// 否则父骨骼视为速度为零的固定锚点，且远端不受子骨骼作用。
    pub fn compute_forces(
        &self,
        parent: Option<&JiggleBone>,
        child: Option<&JiggleBone>,
        config: &PhysicsConfig,
    ) -> JiggleForces {
        let half_gravity = config.gravity() * 0.5;
        let velocity = self.velocity();

        // A 端：锚点跟随父骨骼远端
        // 父骨骼远端取第一个摆动子骨骼的原点，兄弟摆动骨同样被拉向该点
        let point_a = self.dynamic_point_a();
        let (anchor_target, anchor_velocity) = match parent {
            Some(parent) => (parent.dynamic_point_b(), parent.velocity()),
            None => (self.initial_point_a(), Vec3::ZERO),
        };
        let force_a = half_gravity
            + (anchor_target - point_a) * config.spring_scaler
            + (anchor_velocity - velocity) * config.damping_scaler;

        // B 端：与子骨骼对称耦合
        let point_b = self.dynamic_point_b();
        let mut force_b = half_gravity;
        if let Some(child) = child {
            force_b += (child.dynamic_point_a() - point_b) * config.spring_scaler
                + (child.velocity() - velocity) * config.damping_scaler;
        }

        let com = self.physics.center_of_mass;
        JiggleForces {
            force: force_a + force_b,
            torque: (point_b - com).cross(force_b) + (point_a - com).cross(force_a),
        }
    }

    /// 积分一步（第一阶段）
    ///
    /// 施力开关关闭时冻结运动，只推进簿记。
    pub fn integrate(&mut self, dt: f32, forces: &JiggleForces, config: &PhysicsConfig) {
        if !self.is_update_jiggle_physics {
            return;
        }
        if config.force_apply {
            self.physics.update_by_force(
                dt,
                forces.force,
                forces.torque,
                config.orthonormalize_interval,
            );
        } else {
            self.physics.hold();
        }
    }

    /// 提交物理变换（第二阶段）
    ///
    /// 状态出现 NaN/Inf 时保留上一次的变换，并把刚体状态重置为静止。
    /// 返回是否成功提交。
    pub fn update_physics_transformations(&mut self) -> bool {
        if !self.is_update_jiggle_physics {
            return true;
        }
        if !self.physics.is_finite() {
            log::warn!("[Jiggle] 骨骼 '{}' 物理状态非有限，保持上一帧姿态并重置", self.base.name);
            self.physics.initialize();
            return false;
        }
        self.custom_physics_translation = Mat4::from_translation(self.physics.translation);
        self.custom_physics_rotation = Mat4::from_mat3(self.physics.rotation);
        true
    }
}

/// 点 p 关于 c 的对称点
#[inline]
fn reflect_through(p: Vec3, c: Vec3) -> Vec3 {
    c * 2.0 - p
}
