//! Node identifiers backed by a process-wide string interner.
//!
//! Layout passes key a lot of per-node state (degrees, positions, attach
//! point tables) by node id. [`Id`] turns the record's string id into a
//! `Copy` symbol so those maps can be keyed and compared cheaply.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for node identifiers.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`; layout itself is single-threaded, so the
/// lock is only ever contended by concurrent independent layout calls.
///
/// # Memory
///
/// Interned strings are never freed. A process that lays out many nets with
/// distinct node ids grows the table by one entry per distinct id for its
/// whole lifetime. Repeated ids, such as a net laid out again after an edit,
/// reuse their existing entry.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier of a place or transition.
///
/// Equal names always map to the same `Id`, within one layout call and
/// across calls. The backing string stays interned until the process exits,
/// so the interner grows with every distinct id a process has seen.
///
/// # Examples
///
/// ```
/// use petri_layout_core::identifier::Id;
///
/// let place = Id::new("p_start");
/// let same = Id::new("p_start");
///
/// assert_eq!(place, same);
/// assert_eq!(place, "p_start");
/// assert_eq!(place.to_string(), "p_start");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Runs `f` with the string this identifier was interned from.
    ///
    /// The interner lock is held while `f` runs, so `f` must not create or
    /// resolve other identifiers.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|name| f.write_str(name))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|name| name == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_interns_same_symbol() {
        let id1 = Id::new("place_1");
        let id2 = Id::new("place_1");
        let id3 = Id::new("transition_1");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "place_1");
    }

    #[test]
    fn test_relayout_reuses_interned_ids() {
        let first: Vec<Id> = ["relayout_p", "relayout_t"].into_iter().map(Id::new).collect();
        let again: Vec<Id> = ["relayout_p", "relayout_t"].into_iter().map(Id::new).collect();

        assert_eq!(first, again);
        assert_eq!(again[0].to_string(), "relayout_p");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("t_register");
        assert_eq!(format!("{id}"), "t_register");
    }

    #[test]
    fn test_from_string_ref() {
        let owned = String::from("p_end");
        let id: Id = (&owned).into();
        assert_eq!(id, Id::new("p_end"));
    }

    #[test]
    fn test_hash_map_key() {
        use std::collections::HashMap;

        let mut degrees = HashMap::new();
        degrees.insert(Id::new("p1"), 3);
        degrees.insert(Id::new("t1"), 1);

        assert_eq!(degrees.get(&Id::new("p1")), Some(&3));
        assert_eq!(degrees.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("p_wait");

        assert!(id == "p_wait");
        assert!(id != "p_");

        let empty = Id::new("");
        assert!(empty == "");
    }
}
