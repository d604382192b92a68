use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::history::EditCommand;
use crate::math::Point;
use crate::naming::bus::bit_name;
use crate::naming::{inherit, resolve_bus_notation};
use crate::net::{EndpointIndex, NameStrength, NetNaming, NetStore, SegmentId};

/// One connected set of segments sharing a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetComponent {
    pub name: String,
    pub segments: Vec<SegmentId>,
}

/// Outcome of a full naming pass.
#[derive(Debug, Clone, Default)]
pub struct GroupReport {
    /// Components in the order they were named.
    pub components: Vec<NetComponent>,
    /// Segments left with `conflict` set.
    pub conflicts: Vec<SegmentId>,
    /// One [`EditCommand::Rename`] per segment whose naming changed.
    pub commands: Vec<EditCommand>,
}

/// Assigns one consistent name to every connected component of the drawing.
///
/// Names are seeded in priority order: global pins, boundary pins, net
/// labels, user-set names. Each seed then spreads its name over the segments
/// reachable through coincident endpoints. Whatever is left gets a generated
/// default name.
pub struct GroupAllNets {
    tolerance: i64,
    global_suffix: String,
    net_prefix: String,
}

impl GroupAllNets {
    /// Creates a new `GroupAllNets` operation.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            global_suffix: config.global_suffix.clone(),
            net_prefix: config.net_prefix.clone(),
        }
    }

    /// Executes the naming pass, renaming segments in place.
    ///
    /// `counter` numbers generated default names and is advanced past every
    /// name handed out. Conflicts never abort the pass; they are flagged on
    /// the segments involved and logged.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store is internally inconsistent.
    pub fn execute(&self, store: &mut NetStore, counter: &mut u32) -> Result<GroupReport> {
        let ids = store.segment_ids();
        let mut before = Vec::with_capacity(ids.len());
        for &id in &ids {
            let naming = &mut store.segment_mut(id)?.naming;
            before.push(naming.clone());
            naming.conflict = false;
            if naming.strength < NameStrength::Set {
                *naming = NetNaming::default();
            }
        }

        let mut seeds = Vec::new();
        let pins: Vec<_> = store.pins().map(|(_, pin)| pin.clone()).collect();
        for pin in pins.iter().filter(|pin| pin.is_global(&self.global_suffix)) {
            let source = Source::pin(&pin.name, pin.position, false);
            seeds.extend(self.seed(store, &ids, &source)?);
        }
        for pin in pins
            .iter()
            .filter(|pin| pin.is_boundary() && !pin.is_global(&self.global_suffix))
        {
            let source = Source::pin(&pin.name, pin.position, true);
            seeds.extend(self.seed(store, &ids, &source)?);
        }
        let labels: Vec<_> = store.labels().map(|(_, label)| label.clone()).collect();
        for label in &labels {
            let source = Source::label(&label.text, label.position);
            seeds.extend(self.seed(store, &ids, &source)?);
        }
        for &id in &ids {
            if store.segment(id)?.naming.strength == NameStrength::Set {
                seeds.push(id);
            }
        }

        let mut walk = Traversal {
            index: EndpointIndex::build(store, self.tolerance),
            store,
            unprocessed: ids.iter().copied().collect(),
        };
        let mut components = Vec::new();
        for seed in seeds {
            if walk.unprocessed.contains(&seed) {
                components.push(walk.traverse(seed)?);
            }
        }

        let mut used: HashSet<String> = HashSet::new();
        for &id in &ids {
            let naming = &walk.store.segment(id)?.naming;
            if naming.strength >= NameStrength::Inherit {
                used.insert(naming.name_str().to_string());
            }
        }
        for &id in &ids {
            if !walk.unprocessed.contains(&id)
                || walk.store.segment(id)?.naming.strength != NameStrength::NoName
            {
                continue;
            }
            let name = self.next_default_name(counter, &used);
            // A tap flagged earlier keeps its conflict.
            let naming = &mut walk.store.segment_mut(id)?.naming;
            naming.name = Some(name);
            naming.strength = NameStrength::Weak;
            components.push(walk.traverse(id)?);
        }

        let store = walk.store;
        let mut conflicts = Vec::new();
        let mut commands = Vec::new();
        for (&id, before) in ids.iter().zip(before) {
            let after = &store.segment(id)?.naming;
            if after.conflict {
                conflicts.push(id);
            }
            if *after != before {
                commands.push(EditCommand::Rename {
                    segment: id,
                    before,
                    after: after.clone(),
                });
            }
        }

        debug!(
            components = components.len(),
            conflicts = conflicts.len(),
            renamed = commands.len(),
            "grouped nets"
        );

        Ok(GroupReport {
            components,
            conflicts,
            commands,
        })
    }

    /// Names every segment touched by `source` and returns them as seeds.
    fn seed(
        &self,
        store: &mut NetStore,
        ids: &[SegmentId],
        source: &Source<'_>,
    ) -> Result<Vec<SegmentId>> {
        let mut seeded = Vec::new();
        for &id in ids {
            let segment = store.segment_mut(id)?;
            let hit = if source.anywhere_on_segment {
                segment.contains_point(&source.position, self.tolerance)
            } else {
                segment.has_endpoint_at(&source.position, self.tolerance)
            };
            if !hit {
                continue;
            }

            let naming = &mut segment.naming;
            match naming.strength {
                NameStrength::NoName | NameStrength::Weak => {
                    naming.name = Some(source.name.to_string());
                    naming.strength = NameStrength::Inherit;
                }
                NameStrength::Inherit | NameStrength::Set => {
                    if !names_match(naming.name_str(), source.name, source.bus_aware) {
                        naming.conflict = true;
                        warn!(
                            segment = ?id,
                            source = source.kind,
                            expected = source.name,
                            found = naming.name_str(),
                            "net name conflicts with connected {}",
                            source.kind
                        );
                    }
                }
            }
            seeded.push(id);
        }
        Ok(seeded)
    }

    fn next_default_name(&self, counter: &mut u32, used: &HashSet<String>) -> String {
        loop {
            let name = format!("{}{}", self.net_prefix, *counter);
            *counter += 1;
            if !used.contains(&name) {
                return name;
            }
        }
    }
}

/// Where a seeded name comes from.
struct Source<'a> {
    kind: &'static str,
    name: &'a str,
    position: Point,
    /// Labels may sit anywhere on a wire; pins only at its ends.
    anywhere_on_segment: bool,
    bus_aware: bool,
}

impl<'a> Source<'a> {
    fn pin(name: &'a str, position: Point, bus_aware: bool) -> Self {
        Self {
            kind: if bus_aware { "boundary pin" } else { "global pin" },
            name,
            position,
            anywhere_on_segment: false,
            bus_aware,
        }
    }

    fn label(name: &'a str, position: Point) -> Self {
        Self {
            kind: "net label",
            name,
            position,
            anywhere_on_segment: true,
            bus_aware: true,
        }
    }
}

/// Stack-based walk of the "touches" relation.
struct Traversal<'s> {
    store: &'s mut NetStore,
    index: EndpointIndex,
    unprocessed: HashSet<SegmentId>,
}

impl Traversal<'_> {
    /// Spreads the name of `seed` over its reachable component.
    ///
    /// Segments that refuse the name are flagged, stay unprocessed and are
    /// not walked through.
    fn traverse(&mut self, seed: SegmentId) -> Result<NetComponent> {
        self.unprocessed.remove(&seed);
        let mut visited: HashSet<SegmentId> = HashSet::from([seed]);
        let mut stack = vec![seed];
        let mut segments = vec![seed];

        while let Some(current) = stack.pop() {
            let neighbours: Vec<SegmentId> = self
                .index
                .touching(self.store, current)?
                .into_iter()
                .filter(|n| self.unprocessed.contains(n) && !visited.contains(n))
                .collect();

            for next in neighbours {
                visited.insert(next);
                if self.join(current, next)? {
                    self.unprocessed.remove(&next);
                    segments.push(next);
                    stack.push(next);
                }
            }
        }

        let name = self.store.segment(seed)?.naming.name_str().to_string();
        Ok(NetComponent { name, segments })
    }

    /// Hands the name of `from` to `to`. Returns `true` if `to` joined.
    ///
    /// A target that is stronger than the source and named differently is
    /// flagged instead of renaming the source, because the source's name has
    /// already spread to the rest of the component.
    fn join(&mut self, from: SegmentId, to: SegmentId) -> Result<bool> {
        let source_seg = self.store.segment(from)?;
        let target_seg = self.store.segment(to)?;
        let mut source = source_seg.naming.clone();
        let mut target = target_seg.naming.clone();

        let joined = if source_seg.is_bus() != target_seg.is_bus() {
            if source_seg.is_bus() {
                fit_tap(&mut target, &mut source)
            } else {
                fit_tap(&mut source, &mut target)
            }
        } else if target.strength > source.strength && !target.same_name(&source) {
            flag(&mut source, &mut target)
        } else {
            inherit(&mut source, &mut target)
        };

        if !joined && target.conflict {
            warn!(
                segment = ?to,
                kept = target.name_str(),
                refused = source.name_str(),
                "net name conflict between connected segments"
            );
        }

        self.store.segment_mut(from)?.naming = source;
        self.store.segment_mut(to)?.naming = target;
        Ok(joined)
    }
}

/// Reconciles a scalar wire with the bus it touches.
///
/// An unnamed tap carries the first bit of the bus in walk order, or the bus
/// name itself when the bus name has no range. A plain scalar name may name
/// an unnamed bus. Named pairs must already fit; anything else is flagged.
fn fit_tap(scalar: &mut NetNaming, bus: &mut NetNaming) -> bool {
    let handed = |from: &NetNaming| {
        if from.strength >= NameStrength::Inherit {
            NameStrength::Inherit
        } else {
            NameStrength::Weak
        }
    };
    if scalar.strength >= NameStrength::Inherit && bus.strength >= NameStrength::Inherit {
        return tap_fits(scalar.name_str(), bus.name_str()) || flag(scalar, bus);
    }
    match scalar.strength.cmp(&bus.strength) {
        Ordering::Less => {
            scalar.name = Some(tap_name(bus.name_str()));
            scalar.strength = handed(bus);
            true
        }
        Ordering::Greater if !scalar.name_str().contains('<') => {
            bus.name.clone_from(&scalar.name);
            bus.strength = handed(scalar);
            true
        }
        Ordering::Equal if tap_fits(scalar.name_str(), bus.name_str()) => true,
        _ => flag(scalar, bus),
    }
}

/// Name a scalar tap takes from its bus.
fn tap_name(bus: &str) -> String {
    let parsed = resolve_bus_notation(bus);
    if parsed.is_bus() {
        bit_name(&parsed.base, parsed.range.start)
    } else {
        parsed.base
    }
}

/// Returns `true` if a tap named `scalar` belongs to the bus `bus`.
fn tap_fits(scalar: &str, bus: &str) -> bool {
    scalar == bus || is_bus_bit(scalar, bus)
}

fn flag(a: &mut NetNaming, b: &mut NetNaming) -> bool {
    a.conflict = true;
    b.conflict = true;
    false
}

/// Compares a segment name with a pin or label name, treating bus names with
/// the same base and bit set as equal when `bus_aware`.
fn names_match(existing: &str, incoming: &str, bus_aware: bool) -> bool {
    if existing == incoming {
        return true;
    }
    if !bus_aware {
        return false;
    }
    let a = resolve_bus_notation(existing);
    let b = resolve_bus_notation(incoming);
    // Same bit set, either walk direction.
    a.base == b.base
        && a.is_bus() == b.is_bus()
        && a.range.start.min(a.range.end) == b.range.start.min(b.range.end)
        && a.range.start.max(a.range.end) == b.range.start.max(b.range.end)
}

/// Returns `true` if `scalar` names a single bit (`d<2>`) of the bus `bus`.
fn is_bus_bit(scalar: &str, bus: &str) -> bool {
    if !scalar.contains('<') {
        return false;
    }
    let bit = resolve_bus_notation(scalar);
    let bus = resolve_bus_notation(bus);
    bit.base == bus.base
        && bit.range.width() == 1
        && bus.range.contains(bit.range.start)
}
