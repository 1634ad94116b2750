use super::base::{self, stage_transform};
use super::{BaseLayer, StagedLayer};
use crate::backing::{LayerBacking, NativeLayer, StagedAnimations};
use crate::context::LayerAnimationContext;
use crate::curve::CurveValue;
use crate::error::SetupError;
use lottie_data::model::{self as data, Shape};
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
enum ShapeItem {
    Rect(String, data::RectShape),
    Ellipse(String, data::EllipseShape),
    Path(String, data::PathShape),
    Fill(String, data::FillShape),
    Stroke(String, data::StrokeShape),
    MergePaths(String),
}

impl ShapeItem {
    fn name(&self) -> &str {
        match self {
            ShapeItem::Rect(name, _)
            | ShapeItem::Ellipse(name, _)
            | ShapeItem::Path(name, _)
            | ShapeItem::Fill(name, _)
            | ShapeItem::Stroke(name, _)
            | ShapeItem::MergePaths(name) => name,
        }
    }
}

/// Shape items of one group level plus its nested groups.
#[derive(Debug, Default)]
struct ShapeContents {
    items: Vec<ShapeItem>,
    transform: Option<data::Transform>,
    groups: Vec<ShapeGroupLayer>,
}

impl ShapeContents {
    fn build(shapes: &[Shape]) -> Self {
        // Unnamed items get After Effects style names, counted per kind and level.
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        let mut name = |nm: &Option<String>, kind: &'static str| {
            let count = counts.entry(kind).or_default();
            *count += 1;
            nm.clone().unwrap_or_else(|| format!("{kind} {count}"))
        };

        let mut contents = ShapeContents::default();
        for shape in shapes {
            match shape {
                Shape::Group(group) => {
                    let name = name(&group.nm, "Group");
                    contents.groups.push(ShapeGroupLayer {
                        name,
                        contents: ShapeContents::build(&group.it),
                        backing: LayerBacking::default(),
                    });
                }
                Shape::Rect(rect) => contents
                    .items
                    .push(ShapeItem::Rect(name(&rect.nm, "Rectangle"), rect.clone())),
                Shape::Ellipse(ellipse) => contents
                    .items
                    .push(ShapeItem::Ellipse(name(&ellipse.nm, "Ellipse"), ellipse.clone())),
                Shape::Path(path) => contents
                    .items
                    .push(ShapeItem::Path(name(&path.nm, "Path"), path.clone())),
                Shape::Fill(fill) => contents
                    .items
                    .push(ShapeItem::Fill(name(&fill.nm, "Fill"), fill.clone())),
                Shape::Stroke(stroke) => contents
                    .items
                    .push(ShapeItem::Stroke(name(&stroke.nm, "Stroke"), stroke.clone())),
                Shape::MergePaths(merge) => contents
                    .items
                    .push(ShapeItem::MergePaths(name(&merge.nm, "Merge Paths"))),
                Shape::Transform(transform) => contents.transform = Some(transform.t.clone()),
                Shape::Unknown => tracing::debug!("ignoring unknown shape item"),
            }
        }
        contents
    }

    /// Item curves go into `staged` keyed `"<item name>.<property>"`.
    ///
    /// Item names must be unique per level; a repeated name keeps the first
    /// item and records the later one as skipped.
    fn stage_items(
        &self,
        context: &LayerAnimationContext<'_>,
        staged: &mut StagedAnimations,
    ) -> Result<(), SetupError> {
        if let Some(transform) = &self.transform {
            stage_transform(context, transform, staged)?;
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.name()) {
                context
                    .adding_keypath_component(item.name())
                    .assert_compatible(false, "duplicate shape item name; the item is skipped")?;
                continue;
            }
            match item {
                ShapeItem::Rect(name, rect) => {
                    let item_context = context.adding_keypath_component(name.as_str());
                    staged.insert_opt(
                        format!("{name}.size"),
                        item_context.property_animation("Size", &rect.s, base::point)?,
                    );
                    staged.insert_opt(
                        format!("{name}.position"),
                        item_context.property_animation("Position", &rect.p, base::point)?,
                    );
                    staged.insert_opt(
                        format!("{name}.roundness"),
                        item_context.property_animation("Roundness", &rect.r, base::scalar)?,
                    );
                }
                ShapeItem::Ellipse(name, ellipse) => {
                    let item_context = context.adding_keypath_component(name.as_str());
                    staged.insert_opt(
                        format!("{name}.size"),
                        item_context.property_animation("Size", &ellipse.s, base::point)?,
                    );
                    staged.insert_opt(
                        format!("{name}.position"),
                        item_context.property_animation("Position", &ellipse.p, base::point)?,
                    );
                }
                ShapeItem::Path(name, path) => {
                    let item_context = context.adding_keypath_component(name.as_str());
                    staged.insert_opt(
                        format!("{name}.path"),
                        item_context.property_animation("Path", &path.ks, |p: &data::BezierPath| {
                            CurveValue::Path(p.clone())
                        })?,
                    );
                }
                ShapeItem::Fill(name, fill) => {
                    let item_context = context.adding_keypath_component(name.as_str());
                    staged.insert_opt(
                        format!("{name}.fillColor"),
                        item_context.property_animation("Color", &fill.c, base::color)?,
                    );
                    staged.insert_opt(
                        format!("{name}.opacity"),
                        item_context.property_animation("Opacity", &fill.o, base::opacity)?,
                    );
                }
                ShapeItem::Stroke(name, stroke) => {
                    let item_context = context.adding_keypath_component(name.as_str());
                    staged.insert_opt(
                        format!("{name}.strokeColor"),
                        item_context.property_animation("Color", &stroke.c, base::color)?,
                    );
                    staged.insert_opt(
                        format!("{name}.opacity"),
                        item_context.property_animation("Opacity", &stroke.o, base::opacity)?,
                    );
                    staged.insert_opt(
                        format!("{name}.lineWidth"),
                        item_context.property_animation("Stroke Width", &stroke.w, base::scalar)?,
                    );
                }
                ShapeItem::MergePaths(name) => context
                    .adding_keypath_component(name.as_str())
                    .assert_compatible(false, "merge paths are not supported; the item is skipped")?,
            }
        }
        Ok(())
    }

    fn stage_groups(&self, context: &LayerAnimationContext<'_>) -> Result<Vec<StagedLayer>, SetupError> {
        self.groups.iter().map(|group| group.stage(context)).collect()
    }

    fn commit_groups(&mut self, staged: Vec<StagedLayer>) {
        for (group, staged) in self.groups.iter_mut().zip(staged) {
            group.commit(staged);
        }
    }

    fn clear(&mut self) {
        for group in &mut self.groups {
            group.backing.remove_all_animations();
            group.contents.clear();
        }
    }
}

/// One shape group (`gr`), backed by its own native layer.
#[derive(Debug)]
pub struct ShapeGroupLayer {
    name: String,
    contents: ShapeContents,
    backing: LayerBacking,
}

impl ShapeGroupLayer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backing(&self) -> &LayerBacking {
        &self.backing
    }

    pub fn groups(&self) -> &[ShapeGroupLayer] {
        &self.contents.groups
    }

    fn stage(&self, parent_context: &LayerAnimationContext<'_>) -> Result<StagedLayer, SetupError> {
        let context = parent_context.adding_keypath_component(self.name.as_str());
        let mut animations = StagedAnimations::default();
        self.contents.stage_items(&context, &mut animations)?;
        Ok(StagedLayer {
            animations,
            children: self.contents.stage_groups(&context)?,
        })
    }

    fn commit(&mut self, staged: StagedLayer) {
        self.backing.commit(staged.animations);
        self.contents.commit_groups(staged.children);
    }
}

#[derive(Debug)]
pub struct ShapeLayer {
    pub(crate) base: BaseLayer,
    contents: ShapeContents,
}

impl ShapeLayer {
    pub(crate) fn new(base: BaseLayer) -> Self {
        let contents = base
            .model()
            .shapes
            .as_deref()
            .map(ShapeContents::build)
            .unwrap_or_default();
        Self { base, contents }
    }

    pub fn groups(&self) -> &[ShapeGroupLayer] {
        &self.contents.groups
    }

    /// Depth-first search by group name.
    pub fn group_named(&self, name: &str) -> Option<&ShapeGroupLayer> {
        fn find<'a>(groups: &'a [ShapeGroupLayer], name: &str) -> Option<&'a ShapeGroupLayer> {
            groups.iter().find_map(|group| {
                if group.name == name {
                    Some(group)
                } else {
                    find(group.groups(), name)
                }
            })
        }
        find(self.groups(), name)
    }

    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedLayer, SetupError> {
        let mut animations = self.base.stage(context)?;
        self.contents.stage_items(context, &mut animations)?;
        Ok(StagedLayer {
            animations,
            children: self.contents.stage_groups(context)?,
        })
    }

    pub(crate) fn commit_groups(&mut self, staged: Vec<StagedLayer>) {
        self.contents.commit_groups(staged);
    }

    pub(crate) fn clear_groups(&mut self) {
        self.contents.clear();
    }
}
