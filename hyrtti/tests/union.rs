use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use hyrtti::prelude::*;
use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Hierarchy)]
#[repr(u8)]
pub enum MarineId {
    #[hierarchy(ty = dyn Creature)]
    Creature,
    #[hierarchy(ty = dyn Cetacea, parent = Creature)]
    Cetacea,
    #[hierarchy(ty = Whale, parent = Cetacea, concrete)]
    Whale,
    #[hierarchy(ty = Dolphin, parent = Cetacea, concrete)]
    Dolphin,
    #[hierarchy(ty = Leopard, parent = Creature, concrete)]
    Leopard,
}

pub trait Creature: Tagged<Id = MarineId> + Send + Sync {
    fn name(&self) -> &str;
}

pub trait Cetacea: Creature {
    fn dive(&self) -> u32;
}

/// Counts the `clone_from` calls made with it as the source.
#[derive(Debug)]
pub struct Whale {
    name: String,
    reused: Arc<AtomicUsize>,
}

impl Whale {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reused: Arc::default(),
        }
    }
}

impl Clone for Whale {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            reused: Arc::clone(&self.reused),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.name.clone_from(&source.name);
        self.reused = Arc::clone(&source.reused);
        self.reused.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts how many of its copies were dropped.
#[derive(Debug, Clone)]
pub struct Dolphin {
    name: String,
    drops: Arc<AtomicUsize>,
}

impl Dolphin {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            drops: Arc::default(),
        }
    }
}

impl Drop for Dolphin {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct Leopard;

impl Creature for Whale {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Cetacea for Whale {
    fn dive(&self) -> u32 {
        2000
    }
}

impl Creature for Dolphin {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Cetacea for Dolphin {
    fn dive(&self) -> u32 {
        300
    }
}

impl Creature for Leopard {
    fn name(&self) -> &str {
        "leopard seal"
    }
}

#[derive(DynUnion, Debug)]
#[dyn_union(base = dyn Cetacea, clone)]
pub enum Pod {
    Whale(Whale),
    Dolphin(Dolphin),
}

#[derive(DynUnion)]
#[dyn_union(base = dyn Creature)]
pub enum Shore {
    Leopard(Leopard),
    Dolphin(Dolphin),
}

#[test]
fn construction_and_access() {
    let pod = Pod::from(Whale::new("Moby"));

    assert_eq!(pod.rtti(), MarineId::Whale);
    assert!(pod.is::<Whale>());
    assert!(pod.is::<dyn Cetacea>());
    assert!(pod.is::<dyn Creature>());
    assert!(!pod.is::<Dolphin>());

    assert_eq!(pod.get::<Whale>().name, "Moby");
    assert_eq!(pod.get::<dyn Cetacea>().dive(), 2000);
    assert_eq!(pod.base().name(), "Moby");
    assert_eq!(Pod::alternatives(), [MarineId::Whale, MarineId::Dolphin]);
}

#[test]
fn every_view_shares_the_same_address() {
    let pod: Pod = Dolphin::new("Flipper").into();

    let base = pod.base() as *const dyn Cetacea;
    assert!(std::ptr::addr_eq(base, pod.get::<Dolphin>() as *const Dolphin));
    assert!(std::ptr::addr_eq(base, pod.get::<dyn Creature>() as *const dyn Creature));
    match &pod {
        Pod::Dolphin(dolphin) => assert!(std::ptr::addr_eq(base, dolphin as *const Dolphin)),
        Pod::Whale(_) => unreachable!(),
    }
}

#[test]
fn failed_access_reports_the_active_alternative() {
    let pod = Pod::from(Whale::new("Moby"));

    assert_eq!(
        pod.try_get::<Dolphin>().err().unwrap(),
        BadCast {
            hierarchy: "MarineId",
            actual: "Whale",
            target: "Dolphin",
        }
    );
}

#[test]
#[should_panic(expected = "bad cast")]
fn get_on_an_inactive_alternative_panics() {
    let pod = Pod::from(Whale::new("Moby"));
    pod.get::<Dolphin>();
}

#[test]
fn mutable_access() {
    let mut pod = Pod::from(Whale::new("Moby"));

    pod.get_mut::<Whale>().name.push_str(" Dick");
    assert!(pod.try_get_mut::<Dolphin>().is_err());
    assert_eq!(pod.base_mut().name(), "Moby Dick");
}

#[test]
fn clone_keeps_the_active_alternative() {
    let pod = Pod::from(Dolphin::new("Flipper"));
    let copy = pod.clone();

    assert_eq!(copy.rtti(), MarineId::Dolphin);
    assert_eq!(copy.get::<Dolphin>().name, "Flipper");
    assert!(!std::ptr::addr_eq(
        pod.base() as *const dyn Cetacea,
        copy.base() as *const dyn Cetacea
    ));
}

#[test]
fn clone_from_reuses_a_matching_alternative() {
    let source = Pod::from(Whale::new("Moby"));
    let mut target = Pod::from(Whale::new("Willy"));

    target.clone_from(&source);

    assert_eq!(target.get::<Whale>().name, "Moby");
    assert_eq!(source.get::<Whale>().reused.load(Ordering::SeqCst), 1);
}

#[test]
fn clone_from_replaces_a_different_alternative() {
    let dolphin = Dolphin::new("Flipper");
    let drops = Arc::clone(&dolphin.drops);
    let source = Pod::from(Whale::new("Moby"));
    let mut target = Pod::from(dolphin);

    target.clone_from(&source);

    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(target.rtti(), MarineId::Whale);
    assert_eq!(target.get::<Whale>().name, "Moby");
    assert_eq!(source.get::<Whale>().reused.load(Ordering::SeqCst), 0);
}

#[test]
fn completeness_against_the_base() {
    assert!(Pod::is_complete());
    assert!(!Shore::is_complete());
    assert_eq!(Shore::alternatives(), [MarineId::Leopard, MarineId::Dolphin]);
}

#[test]
fn visit_the_active_alternative() {
    let dives = Overload1::<dyn Cetacea, u32>::new()
        .on::<Whale>(|whale| whale.dive() / 1000)
        .on::<Dolphin>(|dolphin| dolphin.dive() / 100)
        .build()
        .unwrap();

    assert_eq!(Pod::from(Whale::new("Moby")).visit(&dives), 2);
    assert_eq!(Pod::from(Dolphin::new("Flipper")).visit(&dives), 3);

    let habitat = Overload1::<dyn Creature, &str>::new()
        .on::<dyn Cetacea>(|_| "open sea")
        .on::<Leopard>(|_| "pack ice")
        .build()
        .unwrap();

    assert_eq!(Pod::from(Dolphin::new("Flipper")).visit(&habitat), "open sea");
    assert_eq!(Shore::from(Leopard).visit(&habitat), "pack ice");
    assert_eq!(Shore::from(Dolphin::new("Flipper")).visit(&habitat), "open sea");
}

#[test]
fn visit_the_active_alternative_mutably() {
    let rename = OverloadMut1::<dyn Cetacea, ()>::new()
        .on::<Whale>(|whale| whale.name.push_str(" Dick"))
        .on::<Dolphin>(|dolphin| dolphin.name.make_ascii_uppercase())
        .build()
        .unwrap();

    let mut pod = Pod::from(Whale::new("Moby"));
    pod.visit_mut(&rename);
    assert_eq!(pod.get::<Whale>().name, "Moby Dick");

    let mut pod = Pod::from(Dolphin::new("Flipper"));
    pod.visit_mut(&rename);
    assert_eq!(pod.get::<Dolphin>().name, "FLIPPER");
}

#[test]
fn visit_with_a_context() {
    let dives = Overload1::<dyn Cetacea, (), u32>::new()
        .on_with::<dyn Cetacea>(|total, cetacean| *total += cetacean.dive())
        .build()
        .unwrap();

    let mut total = 0;
    for pod in [Pod::from(Whale::new("Moby")), Pod::from(Dolphin::new("Flipper"))] {
        pod.visit_with(&dives, &mut total);
    }
    assert_eq!(total, 2300);

    let roll_call = OverloadMut1::<dyn Creature, (), Vec<String>>::new()
        .on_with::<dyn Creature>(|names, creature| names.push(creature.name().to_string()))
        .build()
        .unwrap();

    let mut names = Vec::new();
    Shore::from(Leopard).visit_mut_with(&roll_call, &mut names);
    Shore::from(Dolphin::new("Flipper")).visit_mut_with(&roll_call, &mut names);
    assert_eq!(names, ["leopard seal", "Flipper"]);
}
