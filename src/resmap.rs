use core::fmt;

use indexmap::{IndexMap, map::Entry};

use crate::{object::ManagedObject, resource::ResId};

/// The objects of one manifest stream in input order, keyed by id.
#[derive(Clone, Default)]
pub struct ResourceMap {
    objects: IndexMap<ResId, ManagedObject>,
}

impl fmt::Debug for ResourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.objects.keys()).finish()
    }
}

impl ResourceMap {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn insert(&mut self, object: ManagedObject) -> Result<(), Conflict> {
        match self.objects.entry(object.id()) {
            Entry::Occupied(entry) => Err(Conflict {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(object);
                Ok(())
            }
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ManagedObject> + DoubleEndedIterator {
        self.objects.values()
    }

    /// Writes every object as one document of a multi-document yaml stream.
    pub fn write_yaml(&self, out: &mut dyn std::io::Write) -> anyhow::Result<()> {
        for (i, object) in self.iter().enumerate() {
            if i > 0 {
                writeln!(out, "---")?;
            }
            serde_yaml::to_writer(&mut *out, object)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub id: ResId,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "may not add object with an already registered id `{}`", self.id)
    }
}

impl std::error::Error for Conflict {}
