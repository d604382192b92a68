use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{GeometryError, Result, StoreError};
use crate::history::{EditCommand, UndoStack};
use crate::math::segment_2d::{is_zero_length, lies_strictly_inside};
use crate::math::snap::{snap_segment, snap_to_grid};
use crate::math::{OrientationMode, Point, Vector};
use crate::net::{Entity, LabelData, LabelId, NetStore, PinData, PinId, SegmentData, SegmentId};
use crate::operations::{
    ClearName, GroupAllNets, GroupReport, MergeOverlapping, PinNetMap, PinNets, RenameNet,
    SplitAt,
};

/// An editable schematic: the drawing, its history and its settings.
///
/// Every editing call is one undo step. A call that fails part-way is rolled
/// back and leaves no history entry.
#[derive(Debug)]
pub struct Schematic {
    store: NetStore,
    history: UndoStack<EditCommand>,
    config: EngineConfig,
}

impl Default for Schematic {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Schematic {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: NetStore::new(),
            history: UndoStack::new(config.history_depth),
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &NetStore {
        &self.store
    }

    #[must_use]
    pub fn history(&self) -> &UndoStack<EditCommand> {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolved name of a placed segment, if it has one.
    #[must_use]
    pub fn net_name(&self, id: SegmentId) -> Option<&str> {
        self.store
            .placed_segment(id)
            .ok()
            .and_then(|s| s.naming.name.as_deref())
    }

    // --- Wires ---

    /// Draws a wire from `p1` to `p2`.
    ///
    /// The endpoints are snapped, the wire is merged with collinear wires it
    /// overlaps and split where other wires or pins meet it. Wires its new
    /// endpoints land on are split too, then every net is renamed. Returns
    /// the IDs of the inserted pieces; a wire that snaps to zero length is
    /// dropped and leaves no history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is internally inconsistent.
    pub fn draw_wire(
        &mut self,
        p1: Point,
        p2: Point,
        width: u32,
        mode: OrientationMode,
    ) -> Result<Vec<SegmentId>> {
        let (start, end) = snap_segment(&p1, &p2, mode, self.config.grid);
        if is_zero_length(&start, &end) {
            debug!(x = start.x, y = start.y, "dropped zero-length wire");
            return Ok(Vec::new());
        }

        self.transaction("draw wire", |doc| {
            let candidate = SegmentData::new(start, end)?
                .with_width(width)
                .with_mode(mode);
            let outcome = MergeOverlapping::new(candidate, doc.config.grid).execute(&doc.store)?;
            for id in &outcome.absorbed {
                doc.remove_internal(Entity::Segment(*id));
            }

            let pieces = SplitAt::new(outcome.merged, doc.config.tolerance).execute(&doc.store)?;
            let added: Vec<SegmentId> = pieces
                .into_iter()
                .map(|piece| doc.add_segment_internal(piece))
                .collect();

            doc.split_segments_hit_by(&added)?;
            doc.regroup_internal()?;
            Ok(added)
        })
    }

    /// Takes a wire out of the drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not placed.
    pub fn delete_segment(&mut self, id: SegmentId) -> Result<()> {
        self.transaction("delete wire", |doc| {
            doc.store.placed_segment(id)?;
            doc.remove_internal(Entity::Segment(id));
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Moves a wire by `offset`, snapped to the grid.
    ///
    /// The wire is split where it now crosses wire ends or pins, so the moved
    /// wire may be replaced by several pieces.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not placed.
    pub fn move_segment(&mut self, id: SegmentId, offset: Vector) -> Result<()> {
        self.transaction("move wire", |doc| {
            let [p1, p2] = doc.store.placed_segment(id)?.endpoints();
            doc.reshape_internal(id, [p1 + offset, p2 + offset])?;
            let pieces = doc.split_placed(id)?;
            doc.split_segments_hit_by(&pieces)?;
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Rotates a wire by 90 degrees counter-clockwise about its first endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not placed.
    pub fn rotate_segment(&mut self, id: SegmentId) -> Result<()> {
        self.transaction("rotate wire", |doc| {
            let [p1, p2] = doc.store.placed_segment(id)?.endpoints();
            let d = p2 - p1;
            doc.reshape_internal(id, [p1, p1 + Vector::new(-d.y, d.x)])?;
            let pieces = doc.split_placed(id)?;
            doc.split_segments_hit_by(&pieces)?;
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Gives a wire a user-set name and renames its net.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the wire is not placed.
    pub fn rename_segment(&mut self, id: SegmentId, name: &str) -> Result<()> {
        self.transaction(format!("rename to {name}"), |doc| {
            let cmd = RenameNet::new(id, name).execute(&mut doc.store)?;
            doc.history.push(cmd);
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Drops the resolved name of a wire and renames its net.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire carries a user-set name or is not placed.
    pub fn clear_segment_name(&mut self, id: SegmentId) -> Result<()> {
        self.transaction("clear name", |doc| {
            let cmd = ClearName::new(id).execute(&mut doc.store)?;
            doc.history.push(cmd);
            doc.regroup_internal()?;
            Ok(())
        })
    }

    // --- Pins and labels ---

    /// Places a pin, snapped to the grid, splitting the wire it lands on.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is internally inconsistent.
    pub fn add_pin(&mut self, mut pin: PinData) -> Result<PinId> {
        pin.position = snap_to_grid(&pin.position, self.config.grid);
        self.transaction("add pin", |doc| {
            let position = pin.position;
            let id = doc.store.add_pin(pin);
            doc.history.push(EditCommand::Add(Entity::Pin(id)));
            doc.split_segments_at(&[position])?;
            doc.regroup_internal()?;
            Ok(id)
        })
    }

    /// Moves a pin to `to`, snapped to the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin is not placed.
    pub fn move_pin(&mut self, id: PinId, to: Point) -> Result<()> {
        let after = snap_to_grid(&to, self.config.grid);
        self.transaction("move pin", |doc| {
            if !doc.store.is_placed(Entity::Pin(id)) {
                return Err(StoreError::Detached("pin".into()).into());
            }
            let pin = doc.store.pin_mut(id)?;
            let before = pin.position;
            pin.position = after;
            doc.history.push(EditCommand::MovePin { pin: id, before, after });
            doc.split_segments_at(&[after])?;
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Takes a pin out of the drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin is not placed.
    pub fn remove_pin(&mut self, id: PinId) -> Result<()> {
        self.transaction("remove pin", |doc| {
            if !doc.remove_internal(Entity::Pin(id)) {
                return Err(StoreError::Detached("pin".into()).into());
            }
            doc.regroup_internal()?;
            Ok(())
        })
    }

    /// Places a net label, snapped to the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is internally inconsistent.
    pub fn add_label(&mut self, mut label: LabelData) -> Result<LabelId> {
        label.position = snap_to_grid(&label.position, self.config.grid);
        self.transaction("add label", |doc| {
            let id = doc.store.add_label(label);
            doc.history.push(EditCommand::Add(Entity::Label(id)));
            doc.regroup_internal()?;
            Ok(id)
        })
    }

    // --- Naming and netlisting ---

    /// Recomputes every net name. Any renames form one undo step.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is internally inconsistent.
    pub fn regroup(&mut self) -> Result<GroupReport> {
        self.transaction("regroup nets", Self::regroup_internal)
    }

    /// Pin-to-net pairs of every symbol instance.
    ///
    /// `counter` numbers `dnet` names for unconnected pins; keep one counter
    /// per netlisting pass.
    #[must_use]
    pub fn pin_net_map(&self, counter: &mut u32) -> PinNets {
        PinNetMap::new(self.config.tolerance).execute(&self.store, counter)
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    /// Forgets the newest history command without reverting it.
    pub fn discard_last(&mut self) -> Option<EditCommand> {
        self.history.remove_last_command()
    }

    // --- Internals ---

    /// Runs `f` as one history macro, reverting its commands on error.
    fn transaction<T>(
        &mut self,
        text: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.history.begin_macro(text)?;
        match f(self) {
            Ok(value) => {
                self.history.end_macro()?;
                Ok(value)
            }
            Err(err) => {
                self.history.abort_macro(&mut self.store)?;
                Err(err)
            }
        }
    }

    fn add_segment_internal(&mut self, data: SegmentData) -> SegmentId {
        let id = self.store.add_segment(data);
        self.history.push(EditCommand::Add(Entity::Segment(id)));
        id
    }

    fn remove_internal(&mut self, entity: Entity) -> bool {
        let removed = self.store.detach(entity);
        if removed {
            self.history.push(EditCommand::Remove(entity));
        }
        removed
    }

    fn reshape_internal(&mut self, id: SegmentId, [p1, p2]: [Point; 2]) -> Result<()> {
        let grid = self.config.grid;
        let after = [snap_to_grid(&p1, grid), snap_to_grid(&p2, grid)];
        if is_zero_length(&after[0], &after[1]) {
            return Err(GeometryError::ZeroLength {
                x: after[0].x,
                y: after[0].y,
            }
            .into());
        }
        let segment = self.store.segment_mut(id)?;
        let before = segment.endpoints();
        segment.p1 = after[0];
        segment.p2 = after[1];
        self.history.push(EditCommand::Reshape {
            segment: id,
            before,
            after,
        });
        Ok(())
    }

    /// Splits placed wires that an endpoint of `ids` lands inside.
    fn split_segments_hit_by(&mut self, ids: &[SegmentId]) -> Result<()> {
        let mut points = Vec::with_capacity(ids.len() * 2);
        for id in ids {
            points.extend(self.store.segment(*id)?.endpoints());
        }
        self.split_segments_at(&points)
    }

    /// Splits every placed wire with one of `points` strictly inside it.
    fn split_segments_at(&mut self, points: &[Point]) -> Result<()> {
        let tolerance = self.config.tolerance;
        let hit: Vec<SegmentId> = self
            .store
            .segments()
            .filter(|(_, s)| {
                points
                    .iter()
                    .any(|p| lies_strictly_inside(p, &s.p1, &s.p2, tolerance))
            })
            .map(|(id, _)| id)
            .collect();

        for id in hit {
            self.split_placed(id)?;
        }
        Ok(())
    }

    /// Replaces a placed wire by its pieces wherever other wires end or pins
    /// sit on its interior. Returns the pieces, or `id` alone when unsplit.
    fn split_placed(&mut self, id: SegmentId) -> Result<Vec<SegmentId>> {
        let data = self.store.placed_segment(id)?.clone();
        let pieces = SplitAt::new(data, self.config.tolerance)
            .excluding(id)
            .execute(&self.store)?;
        if pieces.len() < 2 {
            return Ok(vec![id]);
        }
        self.remove_internal(Entity::Segment(id));
        Ok(pieces
            .into_iter()
            .map(|piece| self.add_segment_internal(piece))
            .collect())
    }

    fn regroup_internal(&mut self) -> Result<GroupReport> {
        // Generated names restart at net0 on every pass.
        let mut counter = 0;
        let report = GroupAllNets::new(&self.config).execute(&mut self.store, &mut counter)?;
        for cmd in &report.commands {
            self.history.push(cmd.clone());
        }
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::net::PinDirection;

    fn p(x: i64, y: i64) -> Point {
        Point::new(x, y)
    }

    fn draw(doc: &mut Schematic, a: Point, b: Point) -> Vec<SegmentId> {
        doc.draw_wire(a, b, 0, OrientationMode::Orthogonal).unwrap()
    }

    #[test]
    fn drawing_is_one_undo_step() {
        let mut doc = Schematic::default();
        let ids = draw(&mut doc, p(0, 0), p(40, 0));
        assert_eq!(ids.len(), 1);
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.history().undo_text().as_deref(), Some("draw wire"));
        assert!(doc.undo());
        assert!(doc.store().segment_ids().is_empty());
        assert!(doc.redo());
        assert_eq!(doc.store().segment_ids(), ids);
    }

    #[test]
    fn zero_length_wire_leaves_no_history() {
        let mut doc = Schematic::default();
        assert!(draw(&mut doc, p(3, 3), p(1, 1)).is_empty());
        assert!(doc.history().is_empty());
    }

    #[test]
    fn snapping_locks_to_grid_and_axis() {
        let mut doc = Schematic::default();
        let ids = draw(&mut doc, p(1, 2), p(38, 9));
        let segment = doc.store().segment(ids[0]).unwrap();
        assert_eq!(segment.endpoints(), [p(0, 0), p(40, 0)]);
    }

    #[test]
    fn failed_rename_is_rolled_back() {
        let mut doc = Schematic::default();
        let id = draw(&mut doc, p(0, 0), p(40, 0))[0];
        let before = doc.net_name(id).map(str::to_string);
        assert!(doc.rename_segment(id, "bad name").is_err());
        assert_eq!(doc.net_name(id).map(str::to_string), before);
        assert_eq!(doc.history().len(), 1);
        assert!(!doc.history().is_macro_open());
    }

    #[test]
    fn pin_on_wire_interior_splits_it() {
        let mut doc = Schematic::default();
        draw(&mut doc, p(0, 0), p(40, 0));
        doc.add_pin(PinData::boundary(p(20, 0), "a", PinDirection::Input))
            .unwrap();
        assert_eq!(doc.store().segment_ids().len(), 2);
        assert!(doc.undo());
        assert_eq!(doc.store().segment_ids().len(), 1);
    }

    #[test]
    fn rotation_turns_about_first_endpoint() {
        let mut doc = Schematic::default();
        let id = draw(&mut doc, p(0, 0), p(30, 0))[0];
        doc.rotate_segment(id).unwrap();
        assert_eq!(
            doc.store().segment(id).unwrap().endpoints(),
            [p(0, 0), p(0, 30)]
        );
        doc.undo();
        assert_eq!(
            doc.store().segment(id).unwrap().endpoints(),
            [p(0, 0), p(30, 0)]
        );
    }

    fn net_names(doc: &Schematic) -> Vec<&str> {
        doc.store()
            .segments()
            .map(|(_, s)| s.naming.name_str())
            .collect()
    }

    #[test]
    fn moved_wire_is_split_at_new_junction() {
        let mut doc = Schematic::default();
        let h = draw(&mut doc, p(0, 0), p(40, 0))[0];
        draw(&mut doc, p(20, 10), p(20, 30));
        doc.move_segment(h, Vector::new(0, 10)).unwrap();

        assert!(doc.net_name(h).is_none());
        assert_eq!(doc.store().segment_ids().len(), 3);
        assert_eq!(net_names(&doc), vec!["net0"; 3]);

        assert!(doc.undo());
        assert_eq!(doc.store().segment_ids().len(), 2);
        assert_eq!(doc.net_name(h), Some("net0"));
    }

    #[test]
    fn rotated_wire_is_split_at_new_junction() {
        let mut doc = Schematic::default();
        draw(&mut doc, p(0, 20), p(30, 20));
        let w = draw(&mut doc, p(0, 0), p(40, 0))[0];
        let mut before = net_names(&doc);
        before.sort_unstable();
        assert_eq!(before, vec!["net0", "net1"]);

        doc.rotate_segment(w).unwrap();
        let pieces: Vec<[Point; 2]> = doc
            .store()
            .segments()
            .filter(|(_, s)| s.p1.x == 0 && s.p2.x == 0)
            .map(|(_, s)| s.endpoints())
            .collect();
        assert_eq!(pieces, vec![[p(0, 0), p(0, 20)], [p(0, 20), p(0, 40)]]);
        assert_eq!(net_names(&doc), vec!["net0"; 3]);
    }

    #[test]
    fn moved_wire_picks_up_pin_on_its_interior() {
        let mut doc = Schematic::default();
        doc.add_pin(PinData::boundary(p(20, 10), "a", PinDirection::Input))
            .unwrap();
        let h = draw(&mut doc, p(0, 0), p(40, 0))[0];
        doc.move_segment(h, Vector::new(0, 10)).unwrap();
        assert_eq!(doc.store().segment_ids().len(), 2);
        assert_eq!(net_names(&doc), vec!["a"; 2]);
    }
}
