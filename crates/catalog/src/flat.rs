use std::collections::{HashMap, HashSet};

use crate::error::NormalizeError;
use crate::raw::RawCategory;
use crate::tree::{CategoryNode, NormalizeOptions, Walk};

/// Assemble a flattened category list (linked by `parentId`) into the
/// canonical nested form.
///
/// Records whose parent is absent or not present in `records` become roots.
/// Sibling order follows input order. Records that no root reaches can only
/// sit on a parent-link loop and fail the call.
pub fn assemble_flat(
    records: &[RawCategory],
    options: NormalizeOptions,
) -> Result<Vec<CategoryNode>, NormalizeError> {
    let known: HashSet<String> = records.iter().filter_map(RawCategory::key).collect();

    let mut by_parent: HashMap<String, Vec<&RawCategory>> = HashMap::new();
    let mut roots = Vec::new();
    for record in records {
        match record.parent_key() {
            Some(parent) if known.contains(&parent) => {
                by_parent.entry(parent).or_default().push(record)
            }
            _ => roots.push(record),
        }
    }

    let mut walk = Walk::new(options);
    walk.run(roots, |_, id| by_parent.get(id).cloned().unwrap_or_default())?;

    if let Some(id) = records
        .iter()
        .filter_map(RawCategory::key)
        .find(|id| !walk.seen(id))
    {
        return Err(NormalizeError::MalformedHierarchy { id });
    }
    Ok(walk.finish())
}
