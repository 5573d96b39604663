//! 无窗口演示：一条三节摆动尾巴挂在静止的根骨骼上，打印尾尖轨迹

use glam::{Mat4, Vec3};
use jiggle_engine::physics::{self, PhysicsConfig};
use jiggle_engine::{AnimatedModel, ImportedBone};

/// 以 center 为中心的小顶点云
fn cloud(center: Vec3, radius: f32) -> Vec<Vec3> {
    vec![
        center + Vec3::X * radius,
        center - Vec3::X * radius,
        center + Vec3::Z * radius,
        center - Vec3::Z * radius,
        center + Vec3::Y * radius,
        center - Vec3::Y * radius,
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    physics::set_config(PhysicsConfig {
        spring_scaler: 30.0,
        damping_scaler: 3.0,
        ..Default::default()
    });

    // 尾巴沿 +X 水平伸出，重力会让它下垂
    let bones = vec![
        ImportedBone::plain("root", None, Mat4::IDENTITY),
        ImportedBone::jiggle(
            "tail_0",
            Some("root"),
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            cloud(Vec3::new(0.25, 1.0, 0.0), 0.05),
        ),
        ImportedBone::jiggle(
            "tail_1",
            Some("tail_0"),
            Mat4::from_translation(Vec3::new(0.5, 1.0, 0.0)),
            cloud(Vec3::new(0.75, 1.0, 0.0), 0.05),
        ),
        ImportedBone::jiggle(
            "tail_2",
            Some("tail_1"),
            Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0)),
            cloud(Vec3::new(1.25, 1.0, 0.0), 0.05),
        ),
    ];

    let mut model = AnimatedModel::from_import(&bones, &[])?;
    let enabled = model.set_all_jiggle_enabled(true);
    log::info!("启用 {} 根摆动骨", enabled);

    let tip_id = model
        .skeleton()
        .get_bone_id_by_name("tail_2")
        .ok_or("tail_2 missing")?;

    for frame in 0..=240 {
        model.tick(1.0 / 60.0);

        if frame == 120 {
            // 中途冻结，验证簿记仍在推进
            physics::update_config(|c| c.force_apply = false);
            log::info!("冻结物理");
        }

        if frame % 30 == 0 {
            let tip = model
                .skeleton()
                .get_bone_by_bone_id(tip_id)?
                .as_jiggle()
                .map(|j| j.dynamic_point_b())
                .unwrap_or_default();
            println!("frame {:3}: tail tip = ({:+.3}, {:+.3}, {:+.3})", frame, tip.x, tip.y, tip.z);
        }
    }

    println!("palette: {} bones, {} bytes", model.palette().len(), model.palette().as_bytes().len());
    physics::reset_config();
    Ok(())
}
