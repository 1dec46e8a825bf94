//! Type registry of a closed hierarchy.
//!
//! A [`Hierarchy`] maps every identifier of an identifier enum to its [`Descriptor`]: parent,
//! corporeality and display name. It is assembled once through a [`HierarchyBuilder`], which
//! validates the tree shape, and is immutable afterwards. Ancestor tables are materialised
//! lazily, one per queried test variant.
use log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use strum::{Display, EnumIs};

use crate::{
    ancestry::{AncestorTable, Ancestors, walk_is_ancestor},
    id::{HierarchyId, IdDomain},
    utils::{
        conf::DomainConfig,
        error::{RttiError, RttiResult},
    },
};

/// Whether a variant can be the actual type of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum Corporeality {
    /// Groups other variants, never instantiated.
    #[strum(serialize = "abstract")]
    Abstract,
    /// Instantiable, carries a runtime identifier.
    #[strum(serialize = "concrete")]
    Concrete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor<Id: HierarchyId> {
    pub id: Id,
    /// `None` for the root.
    pub parent: Option<Id>,
    pub corporeality: Corporeality,
    pub name: &'static str,
}

/// Collects variant registrations and validates them into a [`Hierarchy`].
///
/// Registration order is irrelevant.
///
/// ```
/// use hyrtti::prelude::*;
/// # use hyrtti::{HierarchyBuilder, Corporeality};
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr)]
/// # #[repr(u8)]
/// # enum Shape { Shape, Circle }
/// # impl HierarchyId for Shape {
/// #     const NAME: &'static str = "Shape";
/// #     fn to_raw(self) -> i64 { self as i64 }
/// #     fn from_raw(raw: i64) -> Option<Self> { u8::try_from(raw).ok().and_then(Self::from_repr) }
/// #     fn hierarchy() -> &'static Hierarchy<Self> { unimplemented!() }
/// # }
/// let hierarchy = HierarchyBuilder::new()
///     .register(Shape::Circle, Some(Shape::Shape), Corporeality::Concrete, "Circle")
///     .register(Shape::Shape, None, Corporeality::Abstract, "Shape")
///     .build()
///     .unwrap();
/// assert_eq!(hierarchy.root(), Shape::Shape);
/// ```
#[derive(Debug, Clone)]
pub struct HierarchyBuilder<Id: HierarchyId> {
    config: DomainConfig,
    domain: Option<IdDomain>,
    entries: Vec<Descriptor<Id>>,
}

impl<Id: HierarchyId> Default for HierarchyBuilder<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: HierarchyId> HierarchyBuilder<Id> {
    pub fn new() -> Self {
        Self {
            config: DomainConfig::default(),
            domain: None,
            entries: Vec::new(),
        }
    }

    /// Use `config` when probing the identifier domain.
    pub fn with_config(mut self, config: DomainConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an explicitly declared domain instead of probing.
    pub fn with_domain(mut self, domain: IdDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn register(
        mut self,
        id: Id,
        parent: Option<Id>,
        corporeality: Corporeality,
        name: &'static str,
    ) -> Self {
        self.entries.push(Descriptor {
            id,
            parent,
            corporeality,
            name,
        });
        self
    }

    pub fn build(self) -> RttiResult<Hierarchy<Id>> {
        let domain = match self.domain {
            Some(domain) => domain,
            None => IdDomain::probe::<Id>(&self.config)?,
        };
        domain.ensure_dense::<Id>()?;

        let count = domain.count();
        let out_of_domain = |raw: i64| RttiError::OutOfDomain {
            hierarchy: Id::NAME,
            raw,
            count,
        };

        let mut slots: Vec<Option<Descriptor<Id>>> = vec![None; count];
        for entry in self.entries {
            let raw = entry.id.to_raw();
            if !domain.contains(raw) {
                return Err(out_of_domain(raw));
            }
            if let Some(parent) = entry.parent {
                if !domain.contains(parent.to_raw()) {
                    return Err(out_of_domain(parent.to_raw()));
                }
            }

            let slot = &mut slots[entry.id.index()];
            if slot.is_some() {
                return Err(RttiError::DuplicateRegistration {
                    hierarchy: Id::NAME,
                    name: entry.name,
                });
            }
            *slot = Some(entry);
        }

        let mut descriptors = Vec::with_capacity(count);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(descriptor) => descriptors.push(descriptor),
                None => {
                    return Err(RttiError::MissingRegistration {
                        hierarchy: Id::NAME,
                        raw: index as i64,
                    });
                }
            }
        }

        let roots: Vec<&Descriptor<Id>> =
            descriptors.iter().filter(|d| d.parent.is_none()).collect();
        match roots.as_slice() {
            [] => return Err(RttiError::MissingRoot { hierarchy: Id::NAME }),
            [root] if root.id.index() != 0 => {
                return Err(RttiError::RootNotZero {
                    hierarchy: Id::NAME,
                    root: root.name,
                });
            }
            [_] => {}
            many => {
                return Err(RttiError::MultipleRoots {
                    hierarchy: Id::NAME,
                    roots: many.iter().map(|d| d.name).collect(),
                });
            }
        }

        let parents: Vec<Option<usize>> = descriptors
            .iter()
            .map(|d| d.parent.map(HierarchyId::index))
            .collect();
        for descriptor in &descriptors {
            if !walk_is_ancestor(&parents, 0, descriptor.id.index()) {
                return Err(RttiError::Cycle {
                    hierarchy: Id::NAME,
                    name: descriptor.name,
                });
            }
        }

        let hierarchy = Hierarchy {
            descriptors,
            parents,
            domain,
            ancestor_tables: (0..count).map(|_| OnceCell::new()).collect(),
        };

        for descriptor in &hierarchy.descriptors {
            if descriptor.corporeality.is_abstract()
                && hierarchy.concrete_descendants(descriptor.id).next().is_none()
            {
                warn!(
                    "Abstract variant '{}' of '{}' has no concrete descendant",
                    descriptor.name,
                    Id::NAME
                );
            }
        }

        debug!(
            "Registered hierarchy '{}': {} variants ({} concrete), root '{}'",
            Id::NAME,
            count,
            hierarchy.concrete_ids().count(),
            hierarchy.descriptors[0].name
        );

        Ok(hierarchy)
    }
}

/// Validated, immutable registry of one closed hierarchy.
///
/// Every query taking an `Id` is total: the identifier enum and the registry cover the same
/// dense range.
#[derive(Debug)]
pub struct Hierarchy<Id: HierarchyId> {
    descriptors: Vec<Descriptor<Id>>,
    parents: Vec<Option<usize>>,
    domain: IdDomain,
    ancestor_tables: Box<[OnceCell<AncestorTable>]>,
}

impl<Id: HierarchyId> Hierarchy<Id> {
    #[inline]
    pub fn root(&self) -> Id {
        self.descriptors[0].id
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn domain(&self) -> IdDomain {
        self.domain
    }

    #[inline]
    pub fn descriptor(&self, id: Id) -> &Descriptor<Id> {
        &self.descriptors[id.index()]
    }

    #[inline]
    pub fn parent_of(&self, id: Id) -> Option<Id> {
        self.descriptor(id).parent
    }

    #[inline]
    pub fn corporeality(&self, id: Id) -> Corporeality {
        self.descriptor(id).corporeality
    }

    #[inline]
    pub fn is_concrete(&self, id: Id) -> bool {
        self.corporeality(id).is_concrete()
    }

    #[inline]
    pub fn name(&self, id: Id) -> &'static str {
        self.descriptor(id).name
    }

    /// All identifiers, in index order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.descriptors.iter().map(|d| d.id)
    }

    /// Direct children of `id`.
    pub fn children(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.descriptors
            .iter()
            .filter(move |d| d.parent == Some(id))
            .map(|d| d.id)
    }

    pub fn concrete_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.descriptors
            .iter()
            .filter(|d| d.corporeality.is_concrete())
            .map(|d| d.id)
    }

    /// Concrete variants of the subtree rooted at `id`, including `id` itself when concrete.
    pub fn concrete_descendants(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        let table = self.ancestor_table(id);
        table
            .iter()
            .map(|index| self.descriptors[index])
            .filter(|d| d.corporeality.is_concrete())
            .map(|d| d.id)
    }

    /// `id` followed by each of its ancestors, ending with the root.
    pub fn ancestors(&self, id: Id) -> Ancestors<'_, Id> {
        Ancestors::new(self, id)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: Id) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Whether `test` is `actual` or one of its ancestors.
    #[inline]
    pub fn is_ancestor(&self, test: Id, actual: Id) -> bool {
        self.is_ancestor_index(test.index(), actual.index())
    }

    /// Ancestor table of `test`, built on first use.
    pub fn ancestor_table(&self, test: Id) -> &AncestorTable {
        self.table_at(test.index())
    }

    fn table_at(&self, test: usize) -> &AncestorTable {
        self.ancestor_tables[test].get_or_init(|| {
            trace!(
                "Building ancestor table of '{}' in '{}'",
                self.descriptors[test].name,
                Id::NAME
            );
            AncestorTable::build(&self.parents, test)
        })
    }

    #[inline]
    fn is_ancestor_index(&self, test: usize, actual: usize) -> bool {
        self.table_at(test).contains(actual)
    }
}

/// Identifier-erased view of a [`Hierarchy`], used by the arity-agnostic dispatch core.
pub(crate) trait HierarchyView: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn count(&self) -> usize;
    fn name_at(&self, index: usize) -> &'static str;
    fn is_ancestor_at(&self, test: usize, actual: usize) -> bool;
    fn concrete_descendants_at(&self, index: usize) -> Vec<usize>;
}

impl<Id: HierarchyId> HierarchyView for Hierarchy<Id> {
    fn type_name(&self) -> &'static str {
        Id::NAME
    }

    fn count(&self) -> usize {
        self.descriptors.len()
    }

    fn name_at(&self, index: usize) -> &'static str {
        self.descriptors[index].name
    }

    fn is_ancestor_at(&self, test: usize, actual: usize) -> bool {
        self.is_ancestor_index(test, actual)
    }

    fn concrete_descendants_at(&self, index: usize) -> Vec<usize> {
        self.table_at(index)
            .iter()
            .filter(|&i| self.descriptors[i].corporeality.is_concrete())
            .collect()
    }
}
