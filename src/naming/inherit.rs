use crate::net::{NameStrength, NetNaming};

/// Reconciles the names of two connected segments.
///
/// The stronger side hands its name to the weaker one; equal strengths must
/// already agree. Returns `false` and flags both sides as conflicted when
/// neither may override the other. A conflicted pair keeps its names.
///
/// The outcome does not depend on argument order: `inherit(a, b)` and
/// `inherit(b, a)` leave the same name and strength on both sides.
pub fn inherit(this: &mut NetNaming, other: &mut NetNaming) -> bool {
    use NameStrength::{Inherit, NoName, Set, Weak};

    match (this.strength, other.strength) {
        (Set, Set) | (Inherit, Inherit) | (Weak, Weak) => agree(this, other),
        (NoName, NoName) => {
            if this.name_str().is_empty() && other.name_str().is_empty() {
                true
            } else {
                flag(this, other)
            }
        }
        (Set | Inherit, NoName | Weak) | (Set, Inherit) => adopt(other, this, Inherit),
        (NoName | Weak, Inherit | Set) | (Inherit, Set) => adopt(this, other, Inherit),
        (Weak, NoName) => adopt(other, this, Weak),
        (NoName, Weak) => adopt(this, other, Weak),
    }
}

/// Copies the name of `source` onto `target` with the given strength.
fn adopt(target: &mut NetNaming, source: &NetNaming, strength: NameStrength) -> bool {
    target.name.clone_from(&source.name);
    target.strength = strength;
    true
}

fn agree(this: &mut NetNaming, other: &mut NetNaming) -> bool {
    if this.same_name(other) {
        true
    } else {
        flag(this, other)
    }
}

fn flag(this: &mut NetNaming, other: &mut NetNaming) -> bool {
    this.conflict = true;
    other.conflict = true;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use NameStrength::{Inherit, NoName, Set, Weak};

    fn named(name: &str, strength: NameStrength) -> NetNaming {
        NetNaming::new(name, strength)
    }

    fn unnamed() -> NetNaming {
        NetNaming::default()
    }

    #[test]
    fn set_beats_no_name() {
        let mut a = named("VDD", Set);
        let mut b = unnamed();
        assert!(inherit(&mut a, &mut b));
        assert_eq!(b.name.as_deref(), Some("VDD"));
        assert_eq!(b.strength, Inherit);
        assert_eq!(a, named("VDD", Set));
    }

    #[test]
    fn two_set_names_conflict_without_renaming() {
        let mut a = named("A", Set);
        let mut b = named("B", Set);
        assert!(!inherit(&mut a, &mut b));
        assert!(a.conflict && b.conflict);
        assert_eq!(a.name.as_deref(), Some("A"));
        assert_eq!(b.name.as_deref(), Some("B"));
    }

    #[test]
    fn equal_names_are_a_no_op() {
        for strength in [Weak, Inherit, Set] {
            let mut a = named("x", strength);
            let mut b = named("x", strength);
            assert!(inherit(&mut a, &mut b));
            assert!(!a.conflict && !b.conflict);
        }
    }

    #[test]
    fn inherit_yields_to_set() {
        let mut a = named("from_pin", Inherit);
        let mut b = named("user", Set);
        assert!(inherit(&mut a, &mut b));
        assert_eq!(a, named("user", Inherit));
        assert_eq!(b, named("user", Set));
    }

    #[test]
    fn weak_spreads_to_unnamed_as_weak() {
        let mut a = named("net3", Weak);
        let mut b = unnamed();
        assert!(inherit(&mut a, &mut b));
        assert_eq!(b, named("net3", Weak));
    }

    #[test]
    fn weak_yields_to_stronger() {
        let mut a = named("net3", Weak);
        let mut b = named("clk", Inherit);
        assert!(inherit(&mut a, &mut b));
        assert_eq!(a, named("clk", Inherit));
    }

    #[test]
    fn weak_names_must_agree() {
        let mut a = named("net1", Weak);
        let mut b = named("net2", Weak);
        assert!(!inherit(&mut a, &mut b));
        assert!(a.conflict && b.conflict);
    }

    #[test]
    fn unnamed_pairs_succeed_only_when_empty() {
        assert!(inherit(&mut unnamed(), &mut unnamed()));
        let mut a = named("stale", NoName);
        let mut b = unnamed();
        assert!(!inherit(&mut a, &mut b));
        assert!(a.conflict);
    }

    #[test]
    fn outcome_is_order_independent() {
        let samples = [
            unnamed(),
            named("w", Weak),
            named("i", Inherit),
            named("s", Set),
            named("t", Set),
        ];
        for left in &samples {
            for right in &samples {
                let (mut a1, mut b1) = (left.clone(), right.clone());
                let (mut a2, mut b2) = (left.clone(), right.clone());
                let ok1 = inherit(&mut a1, &mut b1);
                let ok2 = inherit(&mut b2, &mut a2);
                assert_eq!(ok1, ok2, "{left:?} vs {right:?}");
                assert_eq!(a1, a2, "{left:?} vs {right:?}");
                assert_eq!(b1, b2, "{left:?} vs {right:?}");
            }
        }
    }
}
