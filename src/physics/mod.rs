//! 摆动骨物理
//!
//! - config: 全局物理参数（重力/弹簧/阻尼缩放、施力开关）
//! - rigid_state: 每根摆动骨的类刚体状态与半隐式欧拉积分

pub mod config;
mod rigid_state;

pub use config::{get_config, reset_config, set_config, update_config, PhysicsConfig};
pub use rigid_state::{
    average, inertia_tensor, orthonormalize, safe_inverse, skew_symmetric, RigidState,
    TOTAL_MASS,
};
