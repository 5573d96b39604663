//! 骨骼集合
//!
//! 拥有全部骨骼（插入顺序 = 骨骼索引 = 稳定 ID）。
//! 摆动骨之间的父/子关系以索引保存，使用时再解析为引用。

use std::collections::{HashMap, VecDeque};

use glam::{Mat4, Vec3};

use super::bone_link::{Bone, BoneLink};
use super::jiggle_bone::JiggleBone;
use crate::physics::PhysicsConfig;
use crate::{EngineError, Result};

/// 骨骼集合
#[derive(Clone, Debug, Default)]
pub struct BoneSet {
    /// 所有骨骼
    bones: Vec<BoneLink>,

    /// 名称 → 索引（重名时保留第一个）
    name_to_index: HashMap<String, usize>,

    /// 子骨骼索引缓存
    children_cache: Vec<Vec<usize>>,

    /// 父索引尚未存在的子骨骼（父索引 → 子骨骼）
    pending_children: HashMap<usize, Vec<usize>>,
}

impl BoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // 构建
    // ========================================

    /// 添加普通骨骼，绑定矩阵为单位阵
    ///
    /// 父索引不在此处校验，层级错误由 `evaluation_order` 报告。
    pub fn add_bone(&mut self, name: &str, parent_id: i32) -> usize {
        self.add_bone_with_bind(name, parent_id, Mat4::IDENTITY, Mat4::IDENTITY)
    }

    /// 添加带绑定姿态的普通骨骼
    pub fn add_bone_with_bind(
        &mut self,
        name: &str,
        parent_id: i32,
        to_bone_from_unit: Mat4,
        to_model_from_bone: Mat4,
    ) -> usize {
        let id = self.bones.len();
        let mut bone = Bone::new(name.to_string(), id, parent_id);
        bone.to_bone_from_unit = to_bone_from_unit;
        bone.to_model_from_bone = to_model_from_bone;
        self.push(BoneLink::Plain(bone))
    }

    /// 添加摆动骨
    ///
    /// `vertices` 为附着顶点（模型空间，绑定姿态），用于计算质心和惯性张量。
    pub fn add_jiggle_bone(
        &mut self,
        name: &str,
        parent_id: i32,
        to_bone_from_unit: Mat4,
        to_model_from_bone: Mat4,
        vertices: Vec<Vec3>,
    ) -> usize {
        let id = self.bones.len();
        let mut bone = Bone::new(name.to_string(), id, parent_id);
        bone.to_bone_from_unit = to_bone_from_unit;
        bone.to_model_from_bone = to_model_from_bone;
        self.push(BoneLink::Jiggle(JiggleBone::new(bone, vertices)))
    }

    /// 追加骨骼并增量维护子骨骼缓存和摆动骨链（均摊 O(1)）
    ///
    /// 每根摆动骨的子骨骼取索引最小的摆动子骨骼；
    /// 远端点取子骨骼原点，叶节点保持锚点关于质心的对称点。
    fn push(&mut self, link: BoneLink) -> usize {
        let id = self.bones.len();
        self.name_to_index.entry(link.name().to_string()).or_insert(id);
        let parent = link.parent_id();
        self.bones.push(link);

        // 先前以本骨骼为父的前向引用（索引均小于 id，保持升序）
        let waiting = self.pending_children.remove(&id).unwrap_or_default();
        self.link_first_jiggle_child(id, &waiting);
        self.children_cache.push(waiting);

        match parent {
            Some(p) if p < id => {
                self.children_cache[p].push(id);
                self.link_first_jiggle_child(p, &[id]);
            }
            Some(p) if p > id => self.pending_children.entry(p).or_default().push(id),
            // 自环和根节点不进入缓存
            _ => {}
        }
        id
    }

    /// 若 `id` 是尚未连接子骨骼的摆动骨，从 `candidates` 中取第一个摆动骨作为子骨骼
    fn link_first_jiggle_child(&mut self, id: usize, candidates: &[usize]) {
        let child = match &self.bones[id] {
            BoneLink::Jiggle(jiggle) if jiggle.child.is_none() => candidates
                .iter()
                .copied()
                .find(|&c| self.bones[c].is_jiggle()),
            _ => None,
        };
        let Some(child) = child else {
            return;
        };
        let child_origin = self.bones[child].bone().bind_origin();
        if let BoneLink::Jiggle(jiggle) = &mut self.bones[id] {
            jiggle.child = Some(child);
            jiggle.end_point = child_origin;
        }
    }

    /// 清空所有骨骼
    pub fn clear(&mut self) {
        self.bones.clear();
        self.name_to_index.clear();
        self.children_cache.clear();
        self.pending_children.clear();
    }

    // ========================================
    // 查询
    // ========================================

    /// 骨骼数量
    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// 按名称查找骨骼索引
    pub fn get_bone_id_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 按索引获取骨骼
    pub fn get_bone_by_bone_id(&self, id: usize) -> Result<&BoneLink> {
        let len = self.bones.len();
        self.bones.get(id).ok_or(EngineError::OutOfRange { index: id, len })
    }

    /// 按索引获取可变骨骼
    pub fn get_bone_by_bone_id_mut(&mut self, id: usize) -> Result<&mut BoneLink> {
        let len = self.bones.len();
        self.bones.get_mut(id).ok_or(EngineError::OutOfRange { index: id, len })
    }

    /// 按名称获取骨骼，找不到时返回 NotFound
    pub fn get_bone_by_name(&self, name: &str) -> Result<&BoneLink> {
        self.get_bone_id_by_name(name)
            .map(|id| &self.bones[id])
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }

    /// 子骨骼索引
    pub fn children(&self, id: usize) -> Result<&[usize]> {
        let len = self.bones.len();
        self.children_cache
            .get(id)
            .map(Vec::as_slice)
            .ok_or(EngineError::OutOfRange { index: id, len })
    }

    /// 遍历所有骨骼
    pub fn iter(&self) -> impl Iterator<Item = &BoneLink> {
        self.bones.iter()
    }

    /// 所有骨骼（按索引）
    #[inline]
    pub fn bones(&self) -> &[BoneLink] {
        &self.bones
    }

    /// 父骨骼索引列表（按骨骼索引）
    pub fn parent_ids(&self) -> Vec<Option<usize>> {
        self.bones.iter().map(BoneLink::parent_id).collect()
    }

    /// 批量导出单位图元矩阵（按骨骼索引）
    pub fn get_to_bone_from_unit(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.extend(self.bones.iter().map(|b| b.bone().to_bone_from_unit));
    }

    /// 批量导出绑定姿态矩阵（按骨骼索引）
    pub fn get_to_model_from_bone(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.extend(self.bones.iter().map(|b| b.bone().to_model_from_bone));
    }

    /// 物理修正矩阵，普通骨骼为单位阵
    pub fn jiggle_transform(&self, id: usize) -> Result<Mat4> {
        self.get_bone_by_bone_id(id).map(BoneLink::jiggle_transform)
    }

    /// 父先于子的求值顺序
    ///
    /// 不假设插入顺序已经是拓扑序；父索引越界、自环或成环时返回 InvalidHierarchy。
    pub fn evaluation_order(&self) -> Result<Vec<usize>> {
        topological_order(&self.parent_ids())
    }

    // ========================================
    // 摆动骨开关
    // ========================================

    /// 切换单根摆动骨的物理
    pub fn set_jiggle_enabled(&mut self, id: usize, enabled: bool) -> Result<()> {
        let link = self.get_bone_by_bone_id_mut(id)?;
        if let BoneLink::Jiggle(jiggle) = link {
            jiggle.set_active(enabled);
            return Ok(());
        }
        Err(EngineError::InvalidConfiguration(format!(
            "bone '{}' is not a jiggle bone",
            link.name()
        )))
    }

    /// 切换所有摆动骨的物理，返回摆动骨数量
    pub fn set_all_jiggle_enabled(&mut self, enabled: bool) -> usize {
        let mut count = 0;
        for jiggle in self.bones.iter_mut().filter_map(BoneLink::as_jiggle_mut) {
            jiggle.set_active(enabled);
            count += 1;
        }
        count
    }

    /// 摆动骨数量
    pub fn jiggle_count(&self) -> usize {
        self.bones.iter().filter(|b| b.is_jiggle()).count()
    }

    // ========================================
    // 每帧更新
    // ========================================

    /// 两阶段更新
    ///
    /// 第一阶段依次积分所有激活的摆动骨（读取邻居当前速度和已提交变换）；
    /// 第二阶段统一提交物理变换。必须先完成第一阶段，
    /// 否则邻居读到的是本帧已提交的一半结果。
    pub fn update(&mut self, dt: f32, config: &PhysicsConfig) {
        let dt = config.clamp_time_step(dt);

        // 第一阶段：积分
        for id in 0..self.bones.len() {
            let forces = match &self.bones[id] {
                BoneLink::Jiggle(jiggle) if jiggle.is_active() => {
                    let parent = jiggle
                        .base
                        .parent_id()
                        .filter(|&p| p != id)
                        .and_then(|p| self.bones.get(p))
                        .and_then(BoneLink::as_active_jiggle);
                    let child = jiggle
                        .child
                        .and_then(|c| self.bones.get(c))
                        .and_then(BoneLink::as_active_jiggle);
                    jiggle.compute_forces(parent, child, config)
                }
                _ => continue,
            };

            if let BoneLink::Jiggle(jiggle) = &mut self.bones[id] {
                jiggle.integrate(dt, &forces, config);
                if config.debug_log {
                    log::debug!(
                        "[Jiggle] '{}' force={:?} torque={:?} translation={:?}",
                        jiggle.base.name,
                        forces.force,
                        forces.torque,
                        jiggle.physics.translation
                    );
                }
            }
        }

        // 第二阶段：提交变换
        for jiggle in self.bones.iter_mut().filter_map(BoneLink::as_jiggle_mut) {
            jiggle.update_physics_transformations();
        }
    }
}

/// Kahn 拓扑排序（根按索引顺序，子按索引顺序）
pub(crate) fn topological_order(parents: &[Option<usize>]) -> Result<Vec<usize>> {
    let count = parents.len();
    let mut children = vec![Vec::new(); count];
    let mut roots = VecDeque::new();

    for (id, parent) in parents.iter().enumerate() {
        match *parent {
            None => roots.push_back(id),
            Some(p) if p == id => {
                return Err(EngineError::InvalidHierarchy(format!(
                    "bone {} is its own parent",
                    id
                )));
            }
            Some(p) if p >= count => {
                return Err(EngineError::InvalidHierarchy(format!(
                    "bone {} has parent {} but only {} bones exist",
                    id, p, count
                )));
            }
            Some(p) => children[p].push(id),
        }
    }

    let mut order = Vec::with_capacity(count);
    while let Some(id) = roots.pop_front() {
        order.push(id);
        roots.extend(children[id].iter().copied());
    }

    if order.len() != count {
        return Err(EngineError::InvalidHierarchy(format!(
            "cycle detected: {} of {} bones reachable from a root",
            order.len(),
            count
        )));
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_skeleton() -> BoneSet {
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("root", -1);
        skeleton.add_bone("spine", 0);
        skeleton.add_bone("head", 1);
        skeleton
    }

    fn cloud_around(center: Vec3) -> Vec<Vec3> {
        vec![
            center + Vec3::new(0.1, 0.0, 0.0),
            center - Vec3::new(0.1, 0.0, 0.0),
            center + Vec3::new(0.0, 0.0, 0.1),
            center - Vec3::new(0.0, 0.0, 0.1),
            center + Vec3::new(0.0, 0.2, 0.0),
            center - Vec3::new(0.0, 0.2, 0.0),
        ]
    }

    /// root(普通) → tail(摆动)，tail 锚点 (0,1,0)，质心 (0,0.5,0)
    fn single_jiggle_skeleton() -> BoneSet {
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("root", -1);
        skeleton.add_jiggle_bone(
            "tail",
            0,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            cloud_around(Vec3::new(0.0, 0.5, 0.0)),
        );
        skeleton
    }

    #[test]
    fn test_add_bone_sequential_ids() {
        let skeleton = chain_skeleton();
        assert_eq!(skeleton.bone_count(), 3);
        for (i, bone) in skeleton.iter().enumerate() {
            assert_eq!(bone.id(), i);
        }
        assert_eq!(skeleton.children(0).unwrap(), &[1]);
        assert_eq!(skeleton.children(1).unwrap(), &[2]);
        assert!(skeleton.children(2).unwrap().is_empty());
    }

    #[test]
    fn test_name_lookup() {
        let skeleton = chain_skeleton();
        assert_eq!(skeleton.get_bone_id_by_name("spine"), Some(1));
        assert_eq!(skeleton.get_bone_id_by_name("tail"), None);
        assert_eq!(skeleton.get_bone_by_name("head").unwrap().id(), 2);
        assert!(matches!(
            skeleton.get_bone_by_name("tail"),
            Err(EngineError::NotFound(name)) if name == "tail"
        ));
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("bone", -1);
        skeleton.add_bone("bone", 0);
        assert_eq!(skeleton.get_bone_id_by_name("bone"), Some(0));
    }

    #[test]
    fn test_bone_id_out_of_range() {
        let skeleton = chain_skeleton();
        assert!(skeleton.get_bone_by_bone_id(2).is_ok());
        assert!(matches!(
            skeleton.get_bone_by_bone_id(3),
            Err(EngineError::OutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_clear() {
        let mut skeleton = chain_skeleton();
        skeleton.clear();
        assert_eq!(skeleton.bone_count(), 0);
        assert_eq!(skeleton.get_bone_id_by_name("root"), None);
        let mut out = vec![Mat4::IDENTITY; 4];
        skeleton.get_to_model_from_bone(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_plain_bones_unchanged_across_ticks() {
        let mut skeleton = chain_skeleton();
        let config = PhysicsConfig::default();
        let mut before = Vec::new();
        skeleton.get_to_model_from_bone(&mut before);
        assert_eq!(before.len(), 3);
        assert!(before.iter().all(|m| *m == Mat4::IDENTITY));

        for _ in 0..10 {
            skeleton.update(0.016, &config);
        }

        let mut after = Vec::new();
        skeleton.get_to_model_from_bone(&mut after);
        assert_eq!(before, after);
        for id in 0..3 {
            assert_eq!(skeleton.jiggle_transform(id).unwrap(), Mat4::IDENTITY);
        }
    }

    #[test]
    fn test_bulk_export_length() {
        let skeleton = single_jiggle_skeleton();
        let mut unit = Vec::new();
        let mut model = Vec::new();
        skeleton.get_to_bone_from_unit(&mut unit);
        skeleton.get_to_model_from_bone(&mut model);
        assert_eq!(unit.len(), skeleton.bone_count());
        assert_eq!(model.len(), skeleton.bone_count());
        assert_eq!(model[1], Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_inactive_jiggle_stays_identity() {
        let mut skeleton = single_jiggle_skeleton();
        let config = PhysicsConfig::default();
        for _ in 0..100 {
            skeleton.update(0.016, &config);
        }
        let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert_eq!(jiggle.custom_physics_translation, Mat4::IDENTITY);
        assert_eq!(jiggle.custom_physics_rotation, Mat4::IDENTITY);
    }

    #[test]
    fn test_single_jiggle_falls_under_gravity() {
        let mut skeleton = single_jiggle_skeleton();
        skeleton.set_jiggle_enabled(1, true).unwrap();
        let config = PhysicsConfig {
            gravity_scaler: 1.0,
            force_apply: true,
            ..Default::default()
        };
        let dt = 0.016;
        skeleton.update(dt, &config);

        let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        // 两端各贡献半重力，锚点处弹簧/阻尼初始为零
        let momentum = jiggle.physics.linear_momentum;
        assert!(momentum.y < 0.0);
        assert!((momentum.y - (-1.0 * dt)).abs() < 1e-6);
        assert!(momentum.x.abs() < 1e-6 && momentum.z.abs() < 1e-6);
        // 变换已在第二阶段提交
        assert_eq!(
            jiggle.custom_physics_translation,
            Mat4::from_translation(jiggle.physics.translation)
        );
    }

    #[test]
    fn test_jiggle_settles_near_anchor() {
        let mut skeleton = single_jiggle_skeleton();
        skeleton.set_jiggle_enabled(1, true).unwrap();
        let config = PhysicsConfig::default();
        for _ in 0..2000 {
            skeleton.update(0.016, &config);
        }
        let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert!(jiggle.physics.is_finite());
        // 弹簧把锚点拉回父骨骼附近
        let anchor_error = (jiggle.dynamic_point_a() - jiggle.initial_point_a()).length();
        assert!(anchor_error < 0.5, "anchor drifted by {}", anchor_error);
    }

    #[test]
    fn test_reenable_resets_state() {
        let mut skeleton = single_jiggle_skeleton();
        skeleton.set_jiggle_enabled(1, true).unwrap();
        let config = PhysicsConfig::default();
        for _ in 0..30 {
            skeleton.update(0.016, &config);
        }
        skeleton.set_jiggle_enabled(1, false).unwrap();
        skeleton.update(0.016, &config);
        {
            let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
            assert_ne!(jiggle.physics.translation, Vec3::ZERO);
            // 关闭后变换冻结
            assert_ne!(jiggle.custom_physics_translation, Mat4::IDENTITY);
        }

        skeleton.set_jiggle_enabled(1, true).unwrap();
        let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert_eq!(jiggle.physics.translation, Vec3::ZERO);
        assert!(jiggle
            .physics
            .center_of_mass
            .abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_force_apply_off_freezes_motion() {
        let mut skeleton = single_jiggle_skeleton();
        skeleton.set_jiggle_enabled(1, true).unwrap();
        let mut config = PhysicsConfig::default();
        for _ in 0..5 {
            skeleton.update(0.016, &config);
        }
        let (translation, velocity) = {
            let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
            (jiggle.physics.translation, jiggle.physics.linear_velocity)
        };

        config.force_apply = false;
        skeleton.update(0.016, &config);

        let jiggle = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert_eq!(jiggle.physics.translation, translation);
        assert_eq!(jiggle.physics.linear_velocity, velocity);
        assert_eq!(jiggle.physics.past_velocity, velocity);
        assert!(jiggle
            .physics
            .center_of_mass
            .abs_diff_eq(jiggle.physics.init_center_of_mass + translation, 1e-6));
    }

    #[test]
    fn test_jiggle_chain_links_child() {
        let mut skeleton = single_jiggle_skeleton();
        let tip = skeleton.add_jiggle_bone(
            "tail_tip",
            1,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 0.2, 0.0)),
            cloud_around(Vec3::new(0.0, -0.1, 0.0)),
        );
        let tail = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert_eq!(tail.child_id(), Some(tip));
        assert!(tail.initial_point_b().abs_diff_eq(Vec3::new(0.0, 0.2, 0.0), 1e-6));

        assert_eq!(skeleton.set_all_jiggle_enabled(true), 2);
        let config = PhysicsConfig::default();
        for _ in 0..200 {
            skeleton.update(0.016, &config);
        }
        for id in 1..=2 {
            let jiggle = skeleton.get_bone_by_bone_id(id).unwrap().as_jiggle().unwrap();
            assert!(jiggle.physics.is_finite());
        }
    }

    #[test]
    fn test_forward_parent_links_on_arrival() {
        // 摆动子骨骼先于摆动父骨骼插入
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("root", -1);
        let tip = skeleton.add_jiggle_bone(
            "tail_tip",
            2,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 0.2, 0.0)),
            cloud_around(Vec3::new(0.0, -0.1, 0.0)),
        );
        assert!(skeleton.children(0).unwrap().is_empty());

        let tail = skeleton.add_jiggle_bone(
            "tail",
            0,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            cloud_around(Vec3::new(0.0, 0.5, 0.0)),
        );
        assert_eq!(skeleton.children(tail).unwrap(), &[tip]);
        assert_eq!(skeleton.children(0).unwrap(), &[tail]);
        let tail = skeleton.get_bone_by_bone_id(tail).unwrap().as_jiggle().unwrap();
        assert_eq!(tail.child_id(), Some(tip));
        assert!(tail.initial_point_b().abs_diff_eq(Vec3::new(0.0, 0.2, 0.0), 1e-6));
    }

    #[test]
    fn test_first_jiggle_child_wins() {
        let mut skeleton = single_jiggle_skeleton();
        skeleton.add_bone("marker", 1);
        let left = skeleton.add_jiggle_bone(
            "left",
            1,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(-0.1, 0.2, 0.0)),
            cloud_around(Vec3::new(-0.1, 0.0, 0.0)),
        );
        skeleton.add_jiggle_bone(
            "right",
            1,
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.1, 0.2, 0.0)),
            cloud_around(Vec3::new(0.1, 0.0, 0.0)),
        );
        assert_eq!(skeleton.children(1).unwrap(), &[2, 3, 4]);
        let tail = skeleton.get_bone_by_bone_id(1).unwrap().as_jiggle().unwrap();
        assert_eq!(tail.child_id(), Some(left));
        assert!(tail.initial_point_b().abs_diff_eq(Vec3::new(-0.1, 0.2, 0.0), 1e-6));
    }

    #[test]
    fn test_long_chain_builds_incrementally() {
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("bone_0", -1);
        for i in 1..50_000 {
            skeleton.add_bone(&format!("bone_{}", i), i as i32 - 1);
        }
        assert_eq!(skeleton.bone_count(), 50_000);
        assert_eq!(skeleton.children(0).unwrap(), &[1]);
        assert_eq!(skeleton.children(48_000).unwrap(), &[48_001]);
        assert!(skeleton.children(49_999).unwrap().is_empty());
        assert_eq!(skeleton.get_bone_id_by_name("bone_31337"), Some(31_337));
    }

    #[test]
    fn test_clear_drops_forward_references() {
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("orphan", 1);
        skeleton.clear();
        skeleton.add_bone("root", -1);
        skeleton.add_bone("child", 0);
        assert_eq!(skeleton.children(1).unwrap(), &[] as &[usize]);
        assert_eq!(skeleton.children(0).unwrap(), &[1]);
    }

    #[test]
    fn test_set_jiggle_on_plain_bone_fails() {
        let mut skeleton = chain_skeleton();
        assert!(matches!(
            skeleton.set_jiggle_enabled(0, true),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            skeleton.set_jiggle_enabled(9, true),
            Err(EngineError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_evaluation_order_handles_unsorted_parents() {
        // 子骨骼先于父骨骼插入
        let mut skeleton = BoneSet::new();
        skeleton.add_bone("hand", 2);
        skeleton.add_bone("root", -1);
        skeleton.add_bone("arm", 1);
        let order = skeleton.evaluation_order().unwrap();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_evaluation_order_rejects_cycles() {
        let parents = vec![None, Some(2), Some(1)];
        assert!(matches!(
            topological_order(&parents),
            Err(EngineError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            topological_order(&[Some(0)]),
            Err(EngineError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            topological_order(&[None, Some(5)]),
            Err(EngineError::InvalidHierarchy(_))
        ));
    }
}
