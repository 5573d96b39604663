//! 摆动骨刚体状态
//!
//! 每根摆动骨持有一份类刚体状态：质心、惯性张量、线/角动量。
//! 总质量固定为 1.0，质量在附着顶点上均匀分布。
//! 积分方式为半隐式欧拉：先由力更新动量/速度，再由新速度更新位置/旋转。

use glam::{Mat3, Vec3};

/// 统一质量
pub const TOTAL_MASS: f32 = 1.0;

/// 惯性张量行列式低于此值视为退化
const DEGENERATE_DETERMINANT: f32 = 1e-8;

/// 刚体状态
#[derive(Clone, Debug)]
pub struct RigidState {
    // ========================================
    // 质量属性
    // ========================================

    /// 当前质心（模型空间）
    pub center_of_mass: Vec3,
    /// 静止时的质心（附着顶点平均值）
    pub init_center_of_mass: Vec3,
    /// 物体空间惯性张量
    pub inertia_tensor_obj: Mat3,
    /// 物体空间惯性张量的逆（缓存）
    inertia_tensor_obj_inverse: Mat3,
    /// 世界空间惯性张量的逆 = R * I⁻¹ * Rᵀ
    pub inertia_tensor_inverse: Mat3,
    /// 总质量
    pub total_mass: f32,

    // ========================================
    // 线运动
    // ========================================

    pub translation: Vec3,
    pub linear_momentum: Vec3,
    pub linear_velocity: Vec3,
    /// 上一步的线速度
    pub past_velocity: Vec3,
    pub force: Vec3,

    // ========================================
    // 角运动
    // ========================================

    /// 旋转（加法积分，需要定期正交化）
    pub rotation: Mat3,
    pub angular_momentum: Vec3,
    pub angular_velocity: Vec3,
    pub torque: Vec3,

    // ========================================
    // 附着顶点
    // ========================================

    /// 静止时的顶点
    pub init_vertices: Vec<Vec3>,
    /// 当前顶点（随刚体移动）
    pub vertices: Vec<Vec3>,

    /// 自上次初始化以来的积分步数
    step_count: u32,
}

impl RigidState {
    /// 从附着顶点创建，并立即初始化为静止状态
    pub fn new(vertices: Vec<Vec3>) -> Self {
        let mut state = Self {
            center_of_mass: Vec3::ZERO,
            init_center_of_mass: Vec3::ZERO,
            inertia_tensor_obj: Mat3::IDENTITY,
            inertia_tensor_obj_inverse: Mat3::IDENTITY,
            inertia_tensor_inverse: Mat3::IDENTITY,
            total_mass: TOTAL_MASS,
            translation: Vec3::ZERO,
            linear_momentum: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            past_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            angular_momentum: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            torque: Vec3::ZERO,
            vertices: vertices.clone(),
            init_vertices: vertices,
            step_count: 0,
        };
        state.initialize();
        state
    }

    /// 重置为静止状态
    ///
    /// 速度/动量清零，质心 = 附着顶点平均值，惯性张量由顶点重新计算。
    /// 顶点为空时质心为原点、惯性张量为单位阵。
    pub fn initialize(&mut self) {
        self.total_mass = TOTAL_MASS;

        self.translation = Vec3::ZERO;
        self.linear_momentum = Vec3::ZERO;
        self.linear_velocity = Vec3::ZERO;
        self.past_velocity = Vec3::ZERO;
        self.force = Vec3::ZERO;

        self.rotation = Mat3::IDENTITY;
        self.angular_momentum = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.torque = Vec3::ZERO;

        self.vertices.clear();
        self.vertices.extend_from_slice(&self.init_vertices);

        self.init_center_of_mass = average(&self.init_vertices);
        self.center_of_mass = self.init_center_of_mass;

        self.inertia_tensor_obj =
            inertia_tensor(&self.init_vertices, self.init_center_of_mass, self.total_mass);
        self.inertia_tensor_obj_inverse = safe_inverse(self.inertia_tensor_obj);
        self.inertia_tensor_inverse = self.inertia_tensor_obj_inverse;

        self.step_count = 0;
    }

    /// 是否有附着顶点
    #[inline]
    pub fn has_vertices(&self) -> bool {
        !self.init_vertices.is_empty()
    }

    /// 按力和力矩积分一步（半隐式欧拉）
    ///
    /// `orthonormalize_interval` 为 0 时不做正交化。
    pub fn update_by_force(
        &mut self,
        dt: f32,
        force: Vec3,
        torque: Vec3,
        orthonormalize_interval: u32,
    ) {
        self.past_velocity = self.linear_velocity;
        self.force = force;
        self.torque = torque;

        self.linear_momentum += force * dt;
        self.angular_momentum += torque * dt;

        self.linear_velocity = self.linear_momentum / self.total_mass;
        self.angular_velocity = self.inertia_tensor_inverse * self.angular_momentum;

        self.translation += self.linear_velocity * dt;
        self.rotation += skew_symmetric(self.angular_velocity) * self.rotation * dt;

        self.step_count = self.step_count.wrapping_add(1);
        if orthonormalize_interval > 0 && self.step_count % orthonormalize_interval == 0 {
            self.rotation = orthonormalize(self.rotation);
        }

        self.center_of_mass = self.init_center_of_mass + self.translation;

        if self.has_vertices() {
            self.inertia_tensor_inverse =
                self.rotation * self.inertia_tensor_obj_inverse * self.rotation.transpose();
            self.update_vertices();
        }
    }

    /// 冻结一步：不施加力，不移动，但推进簿记
    pub fn hold(&mut self) {
        self.past_velocity = self.linear_velocity;
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
        self.center_of_mass = self.init_center_of_mass + self.translation;
    }

    /// 状态是否全部有限
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite()
            && self.rotation.is_finite()
            && self.linear_momentum.is_finite()
            && self.angular_momentum.is_finite()
    }

    /// 将静止空间中的点映射到当前姿态（绕初始质心旋转后平移）
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation
            + self.init_center_of_mass
            + self.rotation * (point - self.init_center_of_mass)
    }

    fn update_vertices(&mut self) {
        for (current, init) in self.vertices.iter_mut().zip(&self.init_vertices) {
            *current = self.center_of_mass + self.rotation * (*init - self.init_center_of_mass);
        }
    }
}

impl Default for RigidState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// ============================================================================
// 辅助函数
// ============================================================================

/// 顶点平均值（空集返回原点）
pub fn average(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// 点质量集合的惯性张量：Σ m (|r|² E - r rᵀ)
///
/// 空集返回单位阵。
pub fn inertia_tensor(points: &[Vec3], center: Vec3, total_mass: f32) -> Mat3 {
    if points.is_empty() {
        return Mat3::IDENTITY;
    }
    let mass = total_mass / points.len() as f32;
    points.iter().fold(Mat3::ZERO, |acc, p| {
        let r = *p - center;
        let outer = Mat3::from_cols(r * r.x, r * r.y, r * r.z);
        acc + (Mat3::IDENTITY * r.length_squared() - outer) * mass
    })
}

/// 求逆，奇异或非有限时返回单位阵
pub fn safe_inverse(m: Mat3) -> Mat3 {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < DEGENERATE_DETERMINANT {
        Mat3::IDENTITY
    } else {
        m.inverse()
    }
}

/// 叉乘矩阵：skew(a) * b = a × b
#[inline]
pub fn skew_symmetric(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

/// Gram-Schmidt 正交化（退化时返回单位阵）
pub fn orthonormalize(m: Mat3) -> Mat3 {
    let x = m.x_axis.normalize_or_zero();
    let y = (m.y_axis - x * x.dot(m.y_axis)).normalize_or_zero();
    if x == Vec3::ZERO || y == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    Mat3::from_cols(x, y, x.cross(y))
}
