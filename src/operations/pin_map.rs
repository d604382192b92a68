use std::collections::BTreeMap;

use tracing::warn;

use crate::naming::bus::{bit_name, DANGLING_PREFIX};
use crate::naming::{match_pin_to_bus, resolve_bus_notation};
use crate::net::{NameStrength, NetStore, PinData};

/// Ordered `(pin bit, net bit)` pairs of every symbol instance.
pub type PinNets = BTreeMap<String, Vec<(String, String)>>;

/// Resolves, for each pin of each placed symbol instance, the net every pin
/// bit connects to.
pub struct PinNetMap {
    tolerance: i64,
}

impl PinNetMap {
    /// Creates a new `PinNetMap` operation.
    #[must_use]
    pub fn new(tolerance: i64) -> Self {
        Self { tolerance }
    }

    /// Executes the lookup.
    ///
    /// Pins that touch no named wire get `dnet{counter}` names; `counter` is
    /// advanced past every such name so repeated calls in one netlisting pass
    /// never collide.
    #[must_use]
    pub fn execute(&self, store: &NetStore, counter: &mut u32) -> PinNets {
        let mut map = PinNets::new();
        for (_, pin) in store.pins() {
            let Some(instance) = pin.instance() else {
                continue;
            };
            let pairs = self.resolve_pin(store, pin, counter);
            map.entry(instance.to_string()).or_default().extend(pairs);
        }
        map
    }

    fn resolve_pin(
        &self,
        store: &NetStore,
        pin: &PinData,
        counter: &mut u32,
    ) -> Vec<(String, String)> {
        let pin_name = resolve_bus_notation(&pin.name);
        // A single-bit pin keeps its written spelling, `a<0>` included.
        let pin_base = if pin_name.is_bus() {
            pin_name.base.as_str()
        } else {
            pin.name.as_str()
        };
        let net = store
            .segments()
            .find(|(_, s)| s.contains_point(&pin.position, self.tolerance))
            .map(|(_, s)| &s.naming)
            .filter(|naming| naming.strength > NameStrength::NoName);

        let Some(naming) = net else {
            return pin_name
                .range
                .indices()
                .into_iter()
                .map(|i| {
                    let dangling = format!("{DANGLING_PREFIX}{}", *counter);
                    *counter += 1;
                    let bit = if pin_name.is_bus() {
                        bit_name(pin_base, i)
                    } else {
                        pin_base.to_string()
                    };
                    (bit, dangling)
                })
                .collect();
        };

        if naming.conflict {
            warn!(
                pin = pin.name.as_str(),
                net = naming.name_str(),
                "pin connected to a net with a naming conflict"
            );
        }
        let net_name = resolve_bus_notation(naming.name_str());
        let (pairs, next) = match_pin_to_bus(
            pin_base,
            pin_name.range,
            &net_name.base,
            net_name.range,
            *counter,
        );
        *counter = next;
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point;
    use crate::net::{PinDirection, SegmentData};

    fn p(x: i64, y: i64) -> Point {
        Point::new(x, y)
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn scalar_pin_on_named_wire() {
        let mut store = NetStore::new();
        store.add_segment(
            SegmentData::new(p(0, 0), p(40, 0))
                .unwrap()
                .with_name("clk", NameStrength::Set),
        );
        store.add_pin(PinData::symbol(p(40, 0), "I1", "ck", PinDirection::Input));
        let map = PinNetMap::new(2).execute(&store, &mut 0);
        assert_eq!(map["I1"], vec![pair("ck", "clk")]);
    }

    #[test]
    fn bus_pin_on_bus_wire_pairs_bits() {
        let mut store = NetStore::new();
        store.add_segment(
            SegmentData::new(p(0, 0), p(40, 0))
                .unwrap()
                .with_width(2)
                .with_name("d<1:0>", NameStrength::Set),
        );
        store.add_pin(PinData::symbol(p(0, 0), "U2", "a<0:1>", PinDirection::Input));
        let map = PinNetMap::new(2).execute(&store, &mut 0);
        assert_eq!(map["U2"], vec![pair("a<0>", "d<1>"), pair("a<1>", "d<0>")]);
    }

    #[test]
    fn unconnected_pins_get_dangling_names() {
        let mut store = NetStore::new();
        store.add_pin(PinData::symbol(p(0, 0), "I1", "a<0:1>", PinDirection::Input));
        store.add_pin(PinData::symbol(p(50, 0), "I2", "y", PinDirection::Output));
        let mut counter = 0;
        let map = PinNetMap::new(2).execute(&store, &mut counter);
        assert_eq!(map["I1"], vec![pair("a<0>", "dnet0"), pair("a<1>", "dnet1")]);
        assert_eq!(map["I2"], vec![pair("y", "dnet2")]);
        assert_eq!(counter, 3);
    }

    #[test]
    fn single_bit_pins_keep_their_index() {
        let mut store = NetStore::new();
        store.add_segment(
            SegmentData::new(p(0, 0), p(40, 0))
                .unwrap()
                .with_name("clk", NameStrength::Set),
        );
        store.add_pin(PinData::symbol(p(0, 0), "I1", "a<0>", PinDirection::Input));
        store.add_pin(PinData::symbol(p(90, 90), "I1", "b<3>", PinDirection::Input));
        let map = PinNetMap::new(2).execute(&store, &mut 0);
        assert_eq!(map["I1"], vec![pair("a<0>", "clk"), pair("b<3>", "dnet0")]);
    }

    #[test]
    fn boundary_pins_are_not_listed() {
        let mut store = NetStore::new();
        store.add_pin(PinData::boundary(p(0, 0), "in", PinDirection::Input));
        assert!(PinNetMap::new(2).execute(&store, &mut 0).is_empty());
    }
}
