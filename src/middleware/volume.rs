use indexmap::IndexMap;

use crate::{
    error::Error,
    object::{PersistentVolumeClaim, STORAGE},
    quantity::Quantity,
};

/// Applies a volume size override to a database claim. Claims only ever grow, the storage
/// layer either refuses to shrink a volume or silently ignores it.
pub struct VolumeClaimGuard<'a> {
    requested: Option<&'a Quantity>,
}

impl<'a> VolumeClaimGuard<'a> {
    pub fn new(requested: Option<&'a Quantity>) -> Self {
        Self { requested }
    }

    /// Leaves the claim untouched on error.
    #[tracing::instrument(skip_all, fields(claim = %pvc.metadata.name))]
    pub fn guard(&self, pvc: &mut PersistentVolumeClaim) -> Result<(), Error> {
        let Some(requested) = self.requested else {
            return Ok(());
        };

        // A claim without a storage request counts as empty.
        let current = pvc.storage().cloned().unwrap_or_default();
        if *requested < current {
            return Err(Error::Capacity {
                current,
                requested: requested.clone(),
            });
        }

        tracing::debug!(%current, %requested, "resizing volume claim");
        pvc.spec.resources.requests = IndexMap::from_iter([(STORAGE.into(), requested.clone())]);
        Ok(())
    }
}
