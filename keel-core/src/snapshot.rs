use crate::{Entity, EntityShape, Registry, Result, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Field values of an entity as of its last load or successful update.
///
/// Declared as a field of the entity (`#[keel(snapshot)] snapshot: Snapshot`) and owned by
/// that instance alone. Values are keyed by field path, the primary field is not tracked.
/// Operations on one instance are not synchronized: at most one write per instance may be in
/// flight.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    values: Option<BTreeMap<String, Value>>,
}

impl Snapshot {
    /// Whether the snapshot holds synced values.
    pub fn is_synced(&self) -> bool {
        self.values.is_some()
    }
    pub fn clear(&mut self) {
        self.values = None;
    }
    /// Synced value of the field at `path`, `None` when absent or not synced.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.as_ref()?.get(path)
    }
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, BTreeMap::len)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replace the snapshot of `entity` with its current values.
///
/// Does nothing when the entity carries no snapshot holder.
pub fn capture<E: Entity>(shape: &EntityShape, entity: &mut E) {
    let current = entity.values();
    let Some(snapshot) = entity.snapshot_mut() else {
        return;
    };
    let values = shape
        .fields
        .iter()
        .filter(|f| !f.role.is_primary())
        .filter_map(|f| {
            let v = &current[f.leaf];
            v.present.then(|| (f.name.clone(), v.value.clone()))
        })
        .collect();
    snapshot.values = Some(values);
}

/// Path of every field differing from the snapshot, `None` without a synced snapshot.
pub fn changed_paths<E: Entity>(shape: &EntityShape, entity: &E) -> Option<Vec<String>> {
    let synced = entity.snapshot()?.values.as_ref()?;
    let current = entity.values();
    let changed = shape
        .fields
        .iter()
        .filter(|f| !f.role.is_primary())
        .filter(|f| {
            let v = &current[f.leaf];
            match (v.present, synced.get(&f.name)) {
                (true, Some(old)) => *old != v.value,
                (false, None) => false,
                _ => true,
            }
        })
        .map(|f| f.name.clone())
        .collect();
    Some(changed)
}

/// Columns whose value differs from the last synced snapshot of `entity`.
///
/// `None` when the entity holds no synced snapshot, callers then fall back to writing every
/// non zero field.
pub fn changed_fields<E: Entity>(entity: &E) -> Result<Option<BTreeSet<String>>> {
    let shape = E::shape()?;
    Ok(changed_paths(&shape, entity).map(|paths| {
        paths
            .iter()
            .filter_map(|path| shape.field(path))
            .map(|f| f.qualified_column())
            .collect()
    }))
}

/// Record the current values of `entity` as synced, for models registered with
/// `partial_update`.
pub fn mark_synced<E: Entity>(entity: &mut E) -> Result<()> {
    let model = Registry::global().model::<E>()?;
    if model.partial_update() {
        capture(&model.shape, entity);
    }
    Ok(())
}
