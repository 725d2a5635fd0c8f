#![warn(
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::use_self,
    clippy::use_debug
)]

//! Interned names of classes, methods and variables.
//!
//! Every name handed to the type checker goes through a [`StringTable`].
//! Two symbols from the same table are equal iff they point to the same
//! entry, which makes comparing and hashing them a pointer operation.

use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
};

/// Maximum edit distance at which two names count as related.
const MAX_RELATED_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Unrelated,
    Related { distance: usize },
}

impl Relation {
    pub fn is_related(self) -> bool {
        match self {
            Relation::Unrelated => false,
            Relation::Related { .. } => true,
        }
    }
}

impl std::cmp::Ord for Relation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use self::Relation::*;
        match (self, other) {
            (Unrelated, Unrelated) => std::cmp::Ordering::Equal,
            (Unrelated, _) => std::cmp::Ordering::Greater,
            (_, Unrelated) => std::cmp::Ordering::Less,
            (Related { distance: d1 }, Related { distance: d2 }) => d1.cmp(d2),
        }
    }
}

impl std::cmp::PartialOrd for Relation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Symbol<'f>(&'f str);

impl<'f> Symbol<'f> {
    fn as_raw(self) -> *const str {
        self.0 as *const str
    }

    pub fn as_str(self) -> &'f str {
        self.0
    }
}

/// Similarity between two names, used to suggest a name when the user
/// probably misspelled one.
pub fn relation_of(a: &str, b: &str) -> Relation {
    let distance = levenshtein::levenshtein(a, b);
    if distance <= MAX_RELATED_DISTANCE {
        Relation::Related { distance }
    } else {
        Relation::Unrelated
    }
}

/// Returns the candidate closest to `name`, if any candidate is related to
/// it at all. Ties are broken alphabetically so the result does not depend
/// on iteration order of the caller's collection.
pub fn most_similar<'f, I>(name: &str, candidates: I) -> Option<Symbol<'f>>
where
    I: IntoIterator<Item = Symbol<'f>>,
{
    candidates
        .into_iter()
        .filter(|candidate| candidate.as_str() != name)
        .map(|candidate| (relation_of(name, candidate.as_str()), candidate))
        .filter(|(relation, _)| relation.is_related())
        .min_by(|(r1, s1), (r2, s2)| r1.cmp(r2).then_with(|| s1.as_str().cmp(s2.as_str())))
        .map(|(_, candidate)| candidate)
}

// A symbol is its entry: start address and length. Entries may share a
// start address when one is a prefix slice of the other.
impl Hash for Symbol<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.as_raw() as *const u8 as usize).hash(state);
        self.0.len().hash(state);
    }
}

impl PartialEq for Symbol<'_> {
    fn eq(&self, other: &Symbol<'_>) -> bool {
        std::ptr::eq(self.as_raw(), other.as_raw())
    }
}

impl Eq for Symbol<'_> {}

impl PartialEq<str> for Symbol<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Default)]
pub struct StringTable<'f> {
    entries: HashSet<&'f str>,
}

impl<'f> StringTable<'f> {
    pub fn new() -> Self {
        StringTable::default()
    }

    pub fn intern(&mut self, value: &'f str) -> Symbol<'f> {
        match self.entries.get(value) {
            Some(entry) => Symbol(entry),
            None => {
                self.entries.insert(value);
                Symbol(value)
            }
        }
    }

    /// Looks up a name without interning it.
    pub fn get(&self, value: &str) -> Option<Symbol<'f>> {
        self.entries.get(value).map(|entry| Symbol(*entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_eq_sym {
        ($a:expr, $b:expr) => {
            assert_eq!($a, $b);
            // equality must come from the shared entry, not from the text
            assert_eq!($a.as_raw() as *const u8, $b.as_raw() as *const u8);
        };
    }

    #[test]
    fn interning_returns_the_first_entry() {
        let owned = String::from("Animal");
        let mut strtab = StringTable::new();

        let a = strtab.intern("Animal");
        let b = strtab.intern(&owned);
        assert_eq!(1, strtab.len());
        assert_eq_sym!(a, b);

        let c = strtab.intern("Dog");
        assert_eq!(2, strtab.len());
        assert_ne!(a, c);
    }

    #[test]
    fn symbols_from_different_tables_differ() {
        let first = String::from("Object");
        let second = String::from("Object");

        let mut t1 = StringTable::new();
        let mut t2 = StringTable::new();

        let a = t1.intern(&first);
        let b = t2.intern(&second);
        assert_ne!(a, b);
        assert!(a == *"Object");
        assert!(b == "Object");
    }

    #[test]
    fn get_does_not_intern() {
        let mut strtab = StringTable::new();
        assert!(strtab.get("bark").is_none());
        assert!(strtab.is_empty());

        let bark = strtab.intern("bark");
        assert_eq_sym!(strtab.get("bark").unwrap(), bark);
    }

    #[test]
    fn prefix_slice_is_a_different_symbol() {
        let source = String::from("DogHouse");
        let mut strtab = StringTable::new();

        let house = strtab.intern(&source);
        let dog = strtab.intern(&source[..3]);
        assert_eq!(2, strtab.len());
        assert_eq!(house.as_raw() as *const u8, dog.as_raw() as *const u8);
        assert_ne!(house, dog);
        assert_eq!(dog, "Dog");

        let mut seen = HashSet::new();
        seen.insert(house);
        assert!(!seen.contains(&dog));
        assert!(seen.contains(&strtab.intern("DogHouse")));
    }

    #[test]
    fn can_intern_empty_string() {
        let mut strtab = StringTable::new();
        strtab.intern("");
        strtab.intern("");
        assert_eq!(1, strtab.len());
    }

    #[test]
    fn relation_is_bounded_edit_distance() {
        assert_eq!(Relation::Related { distance: 1 }, relation_of("bark", "barc"));
        assert_eq!(Relation::Unrelated, relation_of("bark", "feed"));
        assert!(Relation::Related { distance: 2 } < Relation::Unrelated);
    }

    #[test]
    fn most_similar_prefers_smallest_distance() {
        let mut strtab = StringTable::new();
        let names = vec![
            strtab.intern("toString"),
            strtab.intern("hashCode"),
            strtab.intern("toStrin"),
        ];

        let best = most_similar("toStrng", names.iter().cloned()).unwrap();
        assert_eq!(best, "toString");
        assert!(most_similar("wait", names.iter().cloned()).is_none());
    }

    #[test]
    fn most_similar_skips_exact_name() {
        let mut strtab = StringTable::new();
        let names = vec![strtab.intern("bark"), strtab.intern("park")];

        assert_eq!(most_similar("bark", names).unwrap(), "park");
    }
}
