//! Small zoo tour: downcasting, single and double dispatch, tagged unions.
//!
//! Run with `cargo run --example animals`.
use hyrtti::prelude::*;
use rand::Rng;
use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Hierarchy)]
#[repr(u8)]
enum AnimalId {
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
}

trait Animal: Tagged<Id = AnimalId> {
    fn name(&self) -> &str;
}

trait Mammal: Animal {}

trait Fish: Animal {}

#[derive(Debug, Clone)]
struct Cat(String);

#[derive(Debug, Clone)]
struct Dog(String);

#[derive(Debug, Clone)]
struct Goldfish(String);

#[derive(Debug, Clone)]
struct Shark(String);

impl Animal for Cat {
    fn name(&self) -> &str {
        &self.0
    }
}

impl Animal for Dog {
    fn name(&self) -> &str {
        &self.0
    }
}

impl Animal for Goldfish {
    fn name(&self) -> &str {
        &self.0
    }
}

impl Animal for Shark {
    fn name(&self) -> &str {
        &self.0
    }
}

impl Mammal for Cat {}
impl Mammal for Dog {}
impl Fish for Goldfish {}
impl Fish for Shark {}

#[derive(Debug, Clone, DynUnion)]
#[dyn_union(base = dyn Mammal)]
enum Pet {
    Cat(Cat),
    Dog(Dog),
}

const NAMES: [&str; 6] = ["Tom", "Rex", "Bubbles", "Bruce", "Felix", "Nemo"];

fn random_animal(rng: &mut impl Rng) -> Box<dyn Animal> {
    let name = NAMES[rng.random_range(0..NAMES.len())].to_string();
    match rng.random_range(0..4) {
        0 => Box::new(Cat(name)),
        1 => Box::new(Dog(name)),
        2 => Box::new(Goldfish(name)),
        _ => Box::new(Shark(name)),
    }
}

fn main() {
    let hierarchy = AnimalId::hierarchy();
    println!("Hierarchy {} with {} members:", AnimalId::NAME, hierarchy.count());
    for id in hierarchy.ids() {
        println!(
            "  {:indent$}{} ({})",
            "",
            hierarchy.name(id),
            hierarchy.corporeality(id),
            indent = 2 * hierarchy.depth(id)
        );
    }

    let mut rng = rand::rng();
    let zoo: Vec<Box<dyn Animal>> = (0..8).map(|_| random_animal(&mut rng)).collect();

    let habitat = Overload1::<dyn Animal, &str>::new()
        .on::<dyn Mammal>(|_| "land")
        .on::<dyn Fish>(|_| "water")
        .build()
        .unwrap();

    println!("\nHabitats:");
    for animal in &zoo {
        let kind = hierarchy.name(animal.rtti());
        println!("  {} the {} lives on {}", animal.name(), kind, habitat.visit(&**animal));
    }

    let meeting = Overload2::<dyn Animal, dyn Animal, String>::new()
        .on::<dyn Animal, dyn Animal>(|a, b| format!("{} ignores {}", a.name(), b.name()))
        .on::<Cat, dyn Fish>(|cat, fish| format!("{} stares at {}", cat.0, fish.name()))
        .on::<Dog, Cat>(|dog, cat| format!("{} chases {}", dog.0, cat.0))
        .on::<Shark, dyn Animal>(|shark, prey| format!("{} circles {}", shark.0, prey.name()))
        .build()
        .unwrap();

    println!("\nMeetings:");
    for pair in zoo.windows(2) {
        println!("  {}", meeting.visit(&*pair[0], &*pair[1]));
    }

    let mammals = filter_isa::<dyn Mammal, _>(zoo.iter().map(|animal| &**animal)).count();
    println!("\n{mammals} of {} animals are mammals", zoo.len());

    // [land, water]
    let tally = Overload1::<dyn Animal, (), [u32; 2]>::new()
        .on_with::<dyn Mammal>(|counts, _| counts[0] += 1)
        .on_with::<dyn Fish>(|counts, _| counts[1] += 1)
        .build()
        .unwrap();
    let mut counts = [0; 2];
    for animal in &zoo {
        tally.visit_with(&mut counts, &**animal);
    }
    println!("{} on land, {} in water", counts[0], counts[1]);

    let pet = Pet::from(Dog("Rex".to_string()));
    let copy = pet.clone();
    println!(
        "\nPet {} is a {}; its copy is a {}",
        pet.base().name(),
        hierarchy.name(pet.rtti()),
        hierarchy.name(copy.rtti()),
    );
    if let Err(err) = pet.try_get::<Cat>() {
        println!("{err}");
    }
}
