mod common;

use common::AnimalId;
use hyrtti::{Corporeality, HierarchyId, IdDomain};

#[test]
fn registry_shape() {
    let hierarchy = AnimalId::hierarchy();

    assert_eq!(hierarchy.count(), 10);
    assert_eq!(hierarchy.domain(), IdDomain::declared(0, 10));
    assert_eq!(hierarchy.root(), AnimalId::Animal);
    assert_eq!(hierarchy.name(AnimalId::Goldfish), "Goldfish");
    assert_eq!(hierarchy.corporeality(AnimalId::Bird), Corporeality::Abstract);
    assert_eq!(hierarchy.corporeality(AnimalId::Hawk), Corporeality::Concrete);

    assert_eq!(
        hierarchy.children(AnimalId::Animal).collect::<Vec<_>>(),
        [AnimalId::Mammal, AnimalId::Fish, AnimalId::Bird]
    );
    assert_eq!(
        hierarchy.concrete_descendants(AnimalId::Fish).collect::<Vec<_>>(),
        [AnimalId::Goldfish, AnimalId::Shark]
    );
    assert_eq!(hierarchy.concrete_ids().count(), 6);
}

#[test]
fn identifier_round_trip() {
    for id in AnimalId::hierarchy().ids() {
        assert_eq!(AnimalId::from_index(id.index()), Some(id));
    }
    assert_eq!(AnimalId::from_raw(10), None);
    assert_eq!(AnimalId::from_raw(-1), None);
}

#[test]
fn parent_chains_reach_the_root() {
    let hierarchy = AnimalId::hierarchy();
    for id in hierarchy.ids() {
        let chain: Vec<AnimalId> = hierarchy.ancestors(id).collect();
        assert!(chain.len() <= hierarchy.count());
        assert_eq!(chain.first(), Some(&id));
        assert_eq!(chain.last(), Some(&AnimalId::Animal));
        assert_eq!(hierarchy.depth(id), chain.len() - 1);
    }
    assert_eq!(hierarchy.depth(AnimalId::Sparrow), 2);
}

#[test]
fn is_ancestor_agrees_with_parent_walk() {
    let hierarchy = AnimalId::hierarchy();
    for test in hierarchy.ids() {
        let table = hierarchy.ancestor_table(test);
        assert_eq!(table.test(), test.index());
        assert_eq!(table.count(), hierarchy.count());

        for actual in hierarchy.ids() {
            let expected = hierarchy.ancestors(actual).any(|id| id == test);
            assert_eq!(hierarchy.is_ancestor(test, actual), expected, "{test:?} / {actual:?}");
            assert_eq!(table.contains(actual.index()), expected);
        }
    }
}

#[test]
fn ancestry_is_reflexive_and_antisymmetric() {
    let hierarchy = AnimalId::hierarchy();
    for a in hierarchy.ids() {
        assert!(hierarchy.is_ancestor(a, a));
        for b in hierarchy.ids() {
            if a != b && hierarchy.is_ancestor(a, b) {
                assert!(!hierarchy.is_ancestor(b, a));
            }
        }
    }
}
