//! 导入数据契约
//!
//! 导入器（网格/骨骼解析）不在本 crate 中，这里只定义它交付的数据形状，
//! 以及从这些数据构建骨架和动画的步骤。

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::animation::AnimationSystem;
use crate::skeleton::Skeleton;
use crate::{EngineError, Result};

/// 导入的骨骼
#[derive(Clone, Debug)]
pub struct ImportedBone {
    pub name: String,
    /// 父骨骼名称（None 表示根）
    pub parent_name: Option<String>,
    pub to_bone_from_unit: Mat4,
    pub to_model_from_bone: Mat4,
    /// 摆动骨的附着顶点（模型空间）；None 表示普通骨骼
    pub jiggle_vertices: Option<Vec<Vec3>>,
}

impl ImportedBone {
    /// 普通骨骼
    pub fn plain(name: &str, parent_name: Option<&str>, to_model_from_bone: Mat4) -> Self {
        Self {
            name: name.to_string(),
            parent_name: parent_name.map(str::to_string),
            to_bone_from_unit: Mat4::IDENTITY,
            to_model_from_bone,
            jiggle_vertices: None,
        }
    }

    /// 摆动骨
    pub fn jiggle(
        name: &str,
        parent_name: Option<&str>,
        to_model_from_bone: Mat4,
        vertices: Vec<Vec3>,
    ) -> Self {
        Self {
            jiggle_vertices: Some(vertices),
            ..Self::plain(name, parent_name, to_model_from_bone)
        }
    }
}

/// 导入的动画片段
///
/// `samples[bone][frame]` 为按 `frame_rate` 采样的本地变换，骨骼顺序与导入骨骼一致。
#[derive(Clone, Debug)]
pub struct ImportedClip {
    pub name: String,
    pub frame_rate: f32,
    pub samples: Vec<Vec<Mat4>>,
}

impl ImportedClip {
    /// 时长 = (最长轨道帧数 - 1) / 帧率
    pub fn duration(&self) -> f32 {
        let frames = self.samples.iter().map(Vec::len).max().unwrap_or(0);
        if frames < 2 || !(self.frame_rate > 0.0) {
            return 0.0;
        }
        (frames - 1) as f32 / self.frame_rate
    }
}

/// 从导入骨骼构建骨架
///
/// 父骨骼按名称解析，允许父骨骼出现在子骨骼之后。
pub fn build_skeleton(bones: &[ImportedBone]) -> Result<Skeleton> {
    let mut name_to_index = HashMap::with_capacity(bones.len());
    for (id, bone) in bones.iter().enumerate() {
        name_to_index.entry(bone.name.as_str()).or_insert(id);
    }

    let mut skeleton = Skeleton::new();
    for bone in bones {
        let parent_id = match &bone.parent_name {
            None => -1,
            Some(parent) => match name_to_index.get(parent.as_str()) {
                Some(&id) => id as i32,
                None => {
                    return Err(EngineError::InvalidHierarchy(format!(
                        "bone '{}' references unknown parent '{}'",
                        bone.name, parent
                    )));
                }
            },
        };

        match &bone.jiggle_vertices {
            Some(vertices) => skeleton.add_jiggle_bone(
                &bone.name,
                parent_id,
                bone.to_bone_from_unit,
                bone.to_model_from_bone,
                vertices.clone(),
            ),
            None => skeleton.add_bone_with_bind(
                &bone.name,
                parent_id,
                bone.to_bone_from_unit,
                bone.to_model_from_bone,
            ),
        };
    }

    log::info!(
        "[Skeleton] 骨架构建完成: {} 骨骼 ({} 摆动骨)",
        skeleton.bone_count(),
        skeleton.jiggle_count()
    );
    Ok(skeleton)
}

/// 把导入的动画片段注册到动画系统，返回动画索引
pub fn register_clip(system: &mut AnimationSystem, clip: &ImportedClip) -> Result<usize> {
    if clip.samples.len() != system.bone_count() {
        return Err(EngineError::InvalidConfiguration(format!(
            "clip '{}' has {} tracks for {} bones",
            clip.name,
            clip.samples.len(),
            system.bone_count()
        )));
    }

    if !clip.frame_rate.is_finite() || clip.frame_rate <= 0.0 {
        return Err(EngineError::InvalidConfiguration(format!(
            "clip '{}' has non-positive frame rate {}",
            clip.name, clip.frame_rate
        )));
    }

    let duration = clip.duration();
    let index = system.add_animation(&clip.name, duration);
    for samples in &clip.samples {
        let end_time = samples.len().saturating_sub(1) as f32 / clip.frame_rate;
        let frame_rate = clip.frame_rate;
        system.add_track(index, 0.0, end_time, frame_rate, |t| {
            let frame = (t * frame_rate).round() as usize;
            samples
                .get(frame)
                .or(samples.last())
                .copied()
                .unwrap_or(Mat4::IDENTITY)
        })?;
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_names_resolved_out_of_order() {
        let bones = vec![
            ImportedBone::plain("hand", Some("arm"), Mat4::IDENTITY),
            ImportedBone::plain("arm", None, Mat4::IDENTITY),
        ];
        let skeleton = build_skeleton(&bones).unwrap();
        assert_eq!(skeleton.get_bone_by_bone_id(0).unwrap().parent_id(), Some(1));
        assert_eq!(skeleton.evaluation_order().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_unknown_parent() {
        let bones = vec![ImportedBone::plain("hand", Some("ghost"), Mat4::IDENTITY)];
        assert!(matches!(
            build_skeleton(&bones),
            Err(EngineError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn test_jiggle_bones_created() {
        let bones = vec![
            ImportedBone::plain("root", None, Mat4::IDENTITY),
            ImportedBone::jiggle("ear", Some("root"), Mat4::IDENTITY, vec![Vec3::Y]),
        ];
        let skeleton = build_skeleton(&bones).unwrap();
        assert_eq!(skeleton.jiggle_count(), 1);
        assert!(skeleton.get_bone_by_name("ear").unwrap().is_jiggle());
    }

    #[test]
    fn test_clip_duration() {
        let clip = ImportedClip {
            name: "wave".to_string(),
            frame_rate: 30.0,
            samples: vec![vec![Mat4::IDENTITY; 31], vec![Mat4::IDENTITY; 1]],
        };
        assert!((clip.duration() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_register_clip_track_mismatch() {
        let skeleton = build_skeleton(&[ImportedBone::plain("root", None, Mat4::IDENTITY)]).unwrap();
        let mut system = AnimationSystem::new(&skeleton).unwrap();
        let clip = ImportedClip {
            name: "bad".to_string(),
            frame_rate: 30.0,
            samples: vec![],
        };
        assert!(matches!(
            register_clip(&mut system, &clip),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert_eq!(system.animation_count(), 0);
    }
}
