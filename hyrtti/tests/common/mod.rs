#![allow(dead_code)]

use hyrtti::prelude::*;
use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Hierarchy)]
#[repr(u8)]
pub enum AnimalId {
    #[hierarchy(ty = dyn Animal)]
    Animal,
    #[hierarchy(ty = dyn Mammal, parent = Animal)]
    Mammal,
    #[hierarchy(ty = Cat, parent = Mammal, concrete)]
    Cat,
    #[hierarchy(ty = Dog, parent = Mammal, concrete)]
    Dog,
    #[hierarchy(ty = dyn Fish, parent = Animal)]
    Fish,
    #[hierarchy(ty = Goldfish, parent = Fish, concrete)]
    Goldfish,
    #[hierarchy(ty = Shark, parent = Fish, concrete)]
    Shark,
    #[hierarchy(ty = dyn Bird, parent = Animal)]
    Bird,
    #[hierarchy(ty = Sparrow, parent = Bird, concrete)]
    Sparrow,
    #[hierarchy(ty = Hawk, parent = Bird, concrete)]
    Hawk,
}

pub trait Animal: Tagged<Id = AnimalId> + Send + Sync {
    fn name(&self) -> &str;
}

pub trait Mammal: Animal {
    fn legs(&self) -> u32;
}

pub trait Fish: Animal {
    fn depth(&self) -> u32;
}

pub trait Bird: Animal {
    fn wingspan(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cat {
    pub name: String,
    pub lives: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dog {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goldfish {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shark {
    pub name: String,
    pub teeth: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sparrow {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hawk {
    pub name: String,
}

macro_rules! impl_animal {
    ($($ty:ident),*) => {
        $(impl Animal for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_animal!(Cat, Dog, Goldfish, Shark, Sparrow, Hawk);

impl Mammal for Cat {
    fn legs(&self) -> u32 {
        4
    }
}

impl Mammal for Dog {
    fn legs(&self) -> u32 {
        4
    }
}

impl Fish for Goldfish {
    fn depth(&self) -> u32 {
        1
    }
}

impl Fish for Shark {
    fn depth(&self) -> u32 {
        200
    }
}

impl Bird for Sparrow {
    fn wingspan(&self) -> u32 {
        20
    }
}

impl Bird for Hawk {
    fn wingspan(&self) -> u32 {
        110
    }
}

pub fn cat() -> Cat {
    Cat {
        name: "Tom".to_string(),
        lives: 9,
    }
}

pub fn dog() -> Dog {
    Dog {
        name: "Rex".to_string(),
    }
}

pub fn goldfish() -> Goldfish {
    Goldfish {
        name: "Bubbles".to_string(),
    }
}

pub fn shark() -> Shark {
    Shark {
        name: "Bruce".to_string(),
        teeth: 300,
    }
}

pub fn sparrow() -> Sparrow {
    Sparrow {
        name: "Jack".to_string(),
    }
}

pub fn hawk() -> Hawk {
    Hawk {
        name: "Tony".to_string(),
    }
}

/// One animal of each concrete kind, in identifier order.
pub fn zoo() -> Vec<Box<dyn Animal>> {
    vec![
        Box::new(cat()),
        Box::new(dog()),
        Box::new(goldfish()),
        Box::new(shark()),
        Box::new(sparrow()),
        Box::new(hawk()),
    ]
}
