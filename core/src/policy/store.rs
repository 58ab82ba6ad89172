use crate::policy::types::{Policy, PolicyKind, PolicySet};
use crate::types::TypeKey;
use std::collections::HashMap;

/// Policies of one type, split by registration name.
#[derive(Debug, Default)]
struct TypePolicies {
    unnamed: PolicySet,
    named: HashMap<String, PolicySet>,
}

impl TypePolicies {
    fn slot(&self, name: Option<&str>) -> Option<&PolicySet> {
        match name {
            None => Some(&self.unnamed),
            Some(name) => self.named.get(name),
        }
    }

    fn slot_mut(&mut self, name: Option<&str>) -> &mut PolicySet {
        match name {
            None => &mut self.unnamed,
            Some(name) => self.named.entry(name.to_string()).or_default(),
        }
    }

    fn len(&self) -> usize {
        self.unnamed.len() + self.named.values().map(PolicySet::len).sum::<usize>()
    }
}

/// **LOCAL POLICY STORE**
///
/// **PURPOSE**: Policies set for the duration of one resolve call tree
/// **GUARANTEE**: Never shared across independent call trees, so no locking
///
/// Lookups borrow the type and name; only `set` allocates.
#[derive(Debug, Default)]
pub struct PolicyStore {
    entries: HashMap<TypeKey, TypePolicies>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) -> Option<&Policy> {
        self.entries.get(ty)?.slot(name)?.get(kind)
    }

    pub fn set(&mut self, ty: &TypeKey, name: Option<&str>, policy: Policy) {
        match self.entries.get_mut(ty) {
            Some(policies) => policies.slot_mut(name).set(policy),
            None => {
                let mut policies = TypePolicies::default();
                policies.slot_mut(name).set(policy);
                self.entries.insert(ty.clone(), policies);
            }
        }
    }

    pub fn clear(&mut self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) {
        let Some(policies) = self.entries.get_mut(ty) else {
            return;
        };
        match name {
            None => policies.unnamed.clear(kind),
            Some(name) => {
                if let Some(set) = policies.named.get_mut(name) {
                    set.clear(kind);
                    if set.is_empty() {
                        policies.named.remove(name);
                    }
                }
            }
        }
        if policies.len() == 0 {
            self.entries.remove(ty);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(TypePolicies::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
