use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "quiet", "amber", "restless", "gentle", "wandering", "sleepy", "bright", "hollow",
    "curious", "silver", "patient", "misty", "brave", "drifting", "humble", "lucky",
    "velvet", "nimble", "distant", "early",
];

const NOUNS: &[&str] = &[
    "owl", "lantern", "harbor", "fern", "comet", "pebble", "heron", "meadow",
    "kettle", "willow", "otter", "ember", "tide", "sparrow", "maple", "cloud",
    "badger", "river", "moth", "lark",
];

/// An adjective-noun pair such as `quiet-heron`, for authors who do not want
/// to invent a name.
pub fn random_nickname<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("nameless");
    let noun = NOUNS.choose(rng).copied().unwrap_or("visitor");
    format!("{}-{}", adjective, noun)
}
