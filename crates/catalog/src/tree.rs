use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::NormalizeError;
use crate::raw::RawCategory;

pub const DEFAULT_DEPTH_OFFSET: i64 = 1;
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

/// Canonical category node consumed by lists and mappers.
///
/// `children` is `None` when the node has no children; it is never
/// `Some(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CategoryNode>>,
}

impl CategoryNode {
    pub fn children(&self) -> &[CategoryNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Added to the raw depth of each root record.
    pub depth_offset: i64,
    /// Maximum nesting (root = 1) before normalization is aborted.
    pub max_depth: usize,
}

impl NormalizeOptions {
    pub fn with_depth_offset(depth_offset: i64) -> Self {
        Self {
            depth_offset,
            ..Self::default()
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            depth_offset: DEFAULT_DEPTH_OFFSET,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Normalize a nested category response.
///
/// Root depth is `raw depth + base_depth_offset`; every descendant is stamped
/// `parent depth + 1` whatever its raw depth says.
pub fn normalize(
    raw: &[RawCategory],
    base_depth_offset: i64,
) -> Result<Vec<CategoryNode>, NormalizeError> {
    normalize_with(raw, NormalizeOptions::with_depth_offset(base_depth_offset))
}

pub fn normalize_with(
    raw: &[RawCategory],
    options: NormalizeOptions,
) -> Result<Vec<CategoryNode>, NormalizeError> {
    let mut walk = Walk::new(options);
    walk.run(raw.iter().collect(), |record, _| {
        record.children.iter().flatten().collect()
    })?;
    Ok(walk.finish())
}

struct Frame<'a> {
    node: CategoryNode,
    pending: std::vec::IntoIter<&'a RawCategory>,
    children: Vec<CategoryNode>,
}

impl Frame<'_> {
    fn finish(mut self) -> CategoryNode {
        if !self.children.is_empty() {
            self.node.children = Some(self.children);
        }
        self.node
    }
}

/// Explicit-stack traversal shared by the nested and flat entry points.
///
/// The stack is exactly the ancestor chain of the record being visited, so
/// `on_path` detects cycles and `stack.len()` bounds nesting.
pub(crate) struct Walk {
    options: NormalizeOptions,
    seen: HashSet<String>,
    on_path: HashSet<String>,
    out: Vec<CategoryNode>,
}

impl Walk {
    pub(crate) fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            seen: HashSet::new(),
            on_path: HashSet::new(),
            out: Vec::new(),
        }
    }

    pub(crate) fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub(crate) fn finish(self) -> Vec<CategoryNode> {
        self.out
    }

    pub(crate) fn run<'a, F>(
        &mut self,
        roots: Vec<&'a RawCategory>,
        children_of: F,
    ) -> Result<(), NormalizeError>
    where
        F: Fn(&'a RawCategory, &str) -> Vec<&'a RawCategory>,
    {
        let mut stack: Vec<Frame<'a>> = Vec::new();

        for record in roots {
            let Some(id) = self.admit(record)? else {
                continue;
            };
            let depth = root_depth(record.depth, self.options);
            let node = make_node(record, id, depth, record.parent_key());
            stack.push(self.enter(node, record, &children_of));

            while let Some(frame) = stack.last_mut() {
                let next = frame.pending.next();
                let parent_id = frame.node.id.clone();
                let depth = frame.node.depth + 1;

                match next {
                    Some(child) => {
                        let Some(id) = self.admit(child)? else {
                            continue;
                        };
                        if stack.len() >= self.options.max_depth {
                            return Err(NormalizeError::DepthLimitExceeded {
                                id,
                                max: self.options.max_depth,
                            });
                        }
                        let node = make_node(child, id, depth, Some(parent_id));
                        stack.push(self.enter(node, child, &children_of));
                    }
                    None => {
                        let Some(done) = stack.pop() else { break };
                        self.on_path.remove(&done.node.id);
                        let node = done.finish();
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => self.out.push(node),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn enter<'a, F>(
        &mut self,
        node: CategoryNode,
        record: &'a RawCategory,
        children_of: &F,
    ) -> Frame<'a>
    where
        F: Fn(&'a RawCategory, &str) -> Vec<&'a RawCategory>,
    {
        self.seen.insert(node.id.clone());
        self.on_path.insert(node.id.clone());
        let pending = children_of(record, &node.id).into_iter();
        Frame {
            node,
            pending,
            children: Vec::new(),
        }
    }

    /// Returns the record's id if it should be emitted.
    fn admit(&self, record: &RawCategory) -> Result<Option<String>, NormalizeError> {
        let Some(id) = record.key() else {
            warn!(
                name = record.name.as_deref().unwrap_or(""),
                "skipping category record without id"
            );
            return Ok(None);
        };
        if self.on_path.contains(&id) {
            return Err(NormalizeError::MalformedHierarchy { id });
        }
        if self.seen.contains(&id) {
            warn!(%id, "skipping duplicate category id");
            return Ok(None);
        }
        Ok(Some(id))
    }
}

/// Clamped to `[1, u32::MAX - max_depth]` so descendants can always be
/// stamped `parent + 1` without overflowing.
fn root_depth(raw_depth: Option<i64>, options: NormalizeOptions) -> u32 {
    let ceiling = u64::from(u32::MAX)
        .saturating_sub(options.max_depth as u64)
        .max(1);
    let depth = raw_depth.unwrap_or(0).saturating_add(options.depth_offset);
    depth.clamp(1, ceiling as i64) as u32
}

fn make_node(
    record: &RawCategory,
    id: String,
    depth: u32,
    parent_id: Option<String>,
) -> CategoryNode {
    let thumbnail = record.thumbnail_source().and_then(|t| {
        Some(Thumbnail {
            url: t.url()?.to_string(),
            file_id: t.file_id(),
        })
    });
    CategoryNode {
        id,
        name: record.name.clone().unwrap_or_default(),
        code: record.code.clone(),
        depth,
        parent_id,
        thumbnail,
        children: None,
    }
}
