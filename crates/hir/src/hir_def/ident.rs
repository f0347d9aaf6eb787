use cranelift_entity::{PrimaryMap, entity_impl};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::db::HirDb;

/// An interned identifier.
///
/// Identity is by interned index: two identifiers spelled the same way in the
/// same [`HirDb`] compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentId(u32);
entity_impl!(IdentId);

impl IdentId {
    pub fn data(self, db: &HirDb) -> &str {
        db.ident_data(self)
    }
}

/// Identifier interner owned by [`HirDb`].
#[derive(Debug)]
pub struct Interner {
    data: PrimaryMap<IdentId, SmolStr>,
    map: FxHashMap<SmolStr, IdentId>,
}

impl Interner {
    pub(crate) fn new() -> Self {
        Self {
            data: PrimaryMap::new(),
            map: FxHashMap::default(),
        }
    }

    pub(crate) fn intern(&mut self, name: &str) -> IdentId {
        if let Some(&id) = self.map.get(name) {
            return id;
        }
        let id = self.data.push(SmolStr::new(name));
        self.map.insert(SmolStr::new(name), id);
        id
    }

    /// Looks up an identifier without interning it.
    pub(crate) fn get(&self, name: &str) -> Option<IdentId> {
        self.map.get(name).copied()
    }

    pub(crate) fn data(&self, id: IdentId) -> &str {
        self.data[id].as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut interner = Interner::new();
        let a = interner.intern("weight");
        let b = interner.intern("bias");
        let a2 = interner.intern("weight");

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(interner.data(a), "weight");
        assert_eq!(interner.get("bias"), Some(b));
        assert_eq!(interner.get("scale"), None);
    }
}
