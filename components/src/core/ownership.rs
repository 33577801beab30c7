// State ownership model
// Decides once, at construction, whether the primitive or an external caller
// holds the authoritative value

/// Who owns the authoritative value of a primitive's state.
///
/// The kind is selected at construction and never changes afterwards.
/// `Owned` state is mutated by the primitive itself; `External` state lives
/// with whoever constructed the primitive, and the primitive only mirrors
/// the last value that owner pushed.
#[derive(Debug)]
pub enum Ownership<T> {
    /// The primitive holds and mutates the value.
    Owned(T),
    /// An external caller holds the value; this is its last pushed copy.
    External(T),
}

impl<T> Ownership<T> {
    /// Current effective value.
    pub fn value(&self) -> &T {
        match self {
            Ownership::Owned(v) | Ownership::External(v) => v,
        }
    }

    /// True when the value is externally owned (controlled mode).
    pub fn is_external(&self) -> bool {
        matches!(self, Ownership::External(_))
    }
}

impl<T: PartialEq> Ownership<T> {

    /// Apply a change requested from inside the primitive (trigger click,
    /// close affordance). Only `Owned` state mutates. Returns whether the
    /// effective value changed.
    pub fn apply_request(&mut self, next: T) -> bool {
        match self {
            Ownership::Owned(v) => {
                if *v == next {
                    false
                } else {
                    *v = next;
                    true
                }
            }
            Ownership::External(_) => false,
        }
    }

    /// Accept a value pushed by the external owner. Ignored for `Owned`
    /// state. Returns whether the effective value changed.
    pub fn sync(&mut self, next: T) -> bool {
        match self {
            Ownership::External(v) => {
                if *v == next {
                    false
                } else {
                    *v = next;
                    true
                }
            }
            Ownership::Owned(_) => false,
        }
    }
}
