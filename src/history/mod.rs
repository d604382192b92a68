//! Linear undo/redo history with macro grouping.
//!
//! Commands are recorded after they have been applied. A macro collects every
//! command pushed between [`UndoStack::begin_macro`] and
//! [`UndoStack::end_macro`] into one entry that undoes and redoes as a unit.

mod command;

pub use command::EditCommand;

use tracing::warn;

use crate::error::HistoryError;

/// Maximum number of entries kept by default.
pub const DEFAULT_DEPTH: usize = 99;

/// A reversible mutation.
///
/// `undo` and `redo` must not fail. A command whose target entity no longer
/// exists does nothing.
pub trait Command {
    /// What the command mutates.
    type Target;

    fn undo(&self, target: &mut Self::Target);
    fn redo(&self, target: &mut Self::Target);

    /// Short human-readable description.
    fn text(&self) -> String;
}

#[derive(Debug)]
enum Entry<C> {
    Single(C),
    Macro { text: String, commands: Vec<C> },
}

impl<C: Command> Entry<C> {
    fn undo(&self, target: &mut C::Target) {
        match self {
            Self::Single(cmd) => cmd.undo(target),
            Self::Macro { commands, .. } => {
                for cmd in commands.iter().rev() {
                    cmd.undo(target);
                }
            }
        }
    }

    fn redo(&self, target: &mut C::Target) {
        match self {
            Self::Single(cmd) => cmd.redo(target),
            Self::Macro { commands, .. } => {
                for cmd in commands {
                    cmd.redo(target);
                }
            }
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Single(cmd) => cmd.text(),
            Self::Macro { text, .. } => text.clone(),
        }
    }
}

#[derive(Debug)]
struct OpenMacro<C> {
    text: String,
    commands: Vec<C>,
}

/// Bounded linear history of applied commands.
#[derive(Debug)]
pub struct UndoStack<C> {
    entries: Vec<Entry<C>>,
    /// Number of entries currently applied.
    index: usize,
    depth: usize,
    open: Option<OpenMacro<C>>,
}

impl<C: Command> Default for UndoStack<C> {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl<C: Command> UndoStack<C> {
    /// Creates an empty history keeping at most `depth` entries.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            depth: depth.max(1),
            open: None,
        }
    }

    /// Records an applied command.
    ///
    /// Inside a macro the command joins the macro. Otherwise it becomes a new
    /// entry and every undone entry is discarded.
    pub fn push(&mut self, cmd: C) {
        match &mut self.open {
            Some(open) => open.commands.push(cmd),
            None => self.commit(Entry::Single(cmd)),
        }
    }

    /// Starts collecting commands into one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a macro is already open.
    pub fn begin_macro(&mut self, text: impl Into<String>) -> Result<(), HistoryError> {
        if let Some(open) = &self.open {
            return Err(HistoryError::NestedMacro {
                open: open.text.clone(),
            });
        }
        self.open = Some(OpenMacro {
            text: text.into(),
            commands: Vec::new(),
        });
        Ok(())
    }

    /// Closes the open macro. An empty macro leaves no entry behind.
    ///
    /// # Errors
    ///
    /// Returns an error if no macro is open.
    pub fn end_macro(&mut self) -> Result<(), HistoryError> {
        let open = self.open.take().ok_or(HistoryError::NoOpenMacro)?;
        if !open.commands.is_empty() {
            self.commit(Entry::Macro {
                text: open.text,
                commands: open.commands,
            });
        }
        Ok(())
    }

    /// Reverts every command of the open macro and discards it.
    ///
    /// # Errors
    ///
    /// Returns an error if no macro is open.
    pub fn abort_macro(&mut self, target: &mut C::Target) -> Result<(), HistoryError> {
        let open = self.open.take().ok_or(HistoryError::NoOpenMacro)?;
        for cmd in open.commands.iter().rev() {
            cmd.undo(target);
        }
        Ok(())
    }

    /// Returns `true` while a macro is collecting commands.
    #[must_use]
    pub fn is_macro_open(&self) -> bool {
        self.open.is_some()
    }

    /// Undoes one entry. Returns `false` if there is nothing to undo or a
    /// macro is open.
    pub fn undo(&mut self, target: &mut C::Target) -> bool {
        if self.refuse_while_open("undo") || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.entries[self.index].undo(target);
        true
    }

    /// Redoes one entry. Returns `false` if there is nothing to redo or a
    /// macro is open.
    pub fn redo(&mut self, target: &mut C::Target) -> bool {
        if self.refuse_while_open("redo") || self.index == self.entries.len() {
            return false;
        }
        self.entries[self.index].redo(target);
        self.index += 1;
        true
    }

    /// Drops the most recently pushed command without undoing it.
    ///
    /// Inside a macro this drops the macro's last command. Outside, it only
    /// applies when the newest entry is applied; when that entry is a macro
    /// its last command goes, and the entry with it once empty.
    pub fn remove_last_command(&mut self) -> Option<C> {
        if let Some(open) = &mut self.open {
            return open.commands.pop();
        }
        if self.index == 0 || self.index != self.entries.len() {
            return None;
        }
        match self.entries.pop()? {
            Entry::Single(cmd) => {
                self.index -= 1;
                Some(cmd)
            }
            Entry::Macro { text, mut commands } => {
                let last = commands.pop();
                if commands.is_empty() {
                    self.index -= 1;
                } else {
                    self.entries.push(Entry::Macro { text, commands });
                }
                last
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.open.is_none() && self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.open.is_none() && self.index < self.entries.len()
    }

    /// Description of the entry [`UndoStack::undo`] would revert.
    #[must_use]
    pub fn undo_text(&self) -> Option<String> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(Entry::text)
    }

    /// Description of the entry [`UndoStack::redo`] would apply.
    #[must_use]
    pub fn redo_text(&self) -> Option<String> {
        self.entries.get(self.index).map(Entry::text)
    }

    /// Number of recorded entries, undone ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets all history, including an open macro.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.open = None;
    }

    fn commit(&mut self, entry: Entry<C>) {
        self.entries.truncate(self.index);
        self.entries.push(entry);
        if self.entries.len() > self.depth {
            let excess = self.entries.len() - self.depth;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len();
    }

    fn refuse_while_open(&self, action: &str) -> bool {
        if let Some(open) = &self.open {
            warn!(action, open = %open.text, "ignored while a macro is open");
            return true;
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Adds `delta` to a counter.
    #[derive(Debug, PartialEq)]
    struct Add(i64);

    impl Command for Add {
        type Target = i64;

        fn undo(&self, target: &mut i64) {
            *target -= self.0;
        }

        fn redo(&self, target: &mut i64) {
            *target += self.0;
        }

        fn text(&self) -> String {
            format!("add {}", self.0)
        }
    }

    fn apply(stack: &mut UndoStack<Add>, value: &mut i64, delta: i64) {
        let cmd = Add(delta);
        cmd.redo(value);
        stack.push(cmd);
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        for delta in [1, 10, 100] {
            apply(&mut stack, &mut value, delta);
        }
        assert_eq!(value, 111);
        while stack.undo(&mut value) {}
        assert_eq!(value, 0);
        while stack.redo(&mut value) {}
        assert_eq!(value, 111);
        assert!(!stack.redo(&mut value));
    }

    #[test]
    fn push_discards_future() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        apply(&mut stack, &mut value, 1);
        apply(&mut stack, &mut value, 2);
        stack.undo(&mut value);
        apply(&mut stack, &mut value, 5);
        assert_eq!(stack.len(), 2);
        assert!(!stack.can_redo());
        assert_eq!(value, 6);
    }

    #[test]
    fn depth_bound_drops_oldest() {
        let mut stack = UndoStack::new(3);
        let mut value = 0;
        for delta in [1, 2, 4, 8] {
            apply(&mut stack, &mut value, delta);
        }
        assert_eq!(stack.len(), 3);
        while stack.undo(&mut value) {}
        assert_eq!(value, 1);
    }

    #[test]
    fn default_depth_is_99() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        for _ in 0..150 {
            apply(&mut stack, &mut value, 1);
        }
        assert_eq!(stack.len(), DEFAULT_DEPTH);
    }

    #[test]
    fn macro_undoes_as_one_step() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        apply(&mut stack, &mut value, 1000);
        stack.begin_macro("three adds").unwrap();
        for delta in [1, 2, 3] {
            apply(&mut stack, &mut value, delta);
        }
        stack.end_macro().unwrap();
        assert_eq!(value, 1006);
        assert_eq!(stack.undo_text().as_deref(), Some("three adds"));
        assert!(stack.undo(&mut value));
        assert_eq!(value, 1000);
        assert!(stack.redo(&mut value));
        assert_eq!(value, 1006);
    }

    #[test]
    fn nested_macros_are_rejected() {
        let mut stack: UndoStack<Add> = UndoStack::default();
        stack.begin_macro("outer").unwrap();
        assert_eq!(
            stack.begin_macro("inner"),
            Err(HistoryError::NestedMacro {
                open: "outer".into()
            })
        );
        stack.end_macro().unwrap();
        assert_eq!(stack.end_macro(), Err(HistoryError::NoOpenMacro));
    }

    #[test]
    fn empty_macro_records_nothing() {
        let mut stack: UndoStack<Add> = UndoStack::default();
        stack.begin_macro("noop").unwrap();
        stack.end_macro().unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn abort_reverts_open_macro() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        stack.begin_macro("doomed").unwrap();
        apply(&mut stack, &mut value, 4);
        apply(&mut stack, &mut value, 5);
        stack.abort_macro(&mut value).unwrap();
        assert_eq!(value, 0);
        assert!(stack.is_empty());
        assert!(!stack.is_macro_open());
    }

    #[test]
    fn undo_is_refused_inside_macro() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        apply(&mut stack, &mut value, 1);
        stack.begin_macro("open").unwrap();
        assert!(!stack.undo(&mut value));
        assert_eq!(value, 1);
    }

    #[test]
    fn remove_last_command_skips_undo() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        apply(&mut stack, &mut value, 1);
        apply(&mut stack, &mut value, 2);
        assert_eq!(stack.remove_last_command(), Some(Add(2)));
        assert_eq!(value, 3);
        assert_eq!(stack.len(), 1);
        assert!(stack.undo(&mut value));
        assert_eq!(value, 2);
    }

    #[test]
    fn remove_last_command_trims_macro() {
        let mut stack = UndoStack::default();
        let mut value = 0;
        stack.begin_macro("pair").unwrap();
        apply(&mut stack, &mut value, 1);
        apply(&mut stack, &mut value, 2);
        stack.end_macro().unwrap();
        assert_eq!(stack.remove_last_command(), Some(Add(2)));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.remove_last_command(), Some(Add(1)));
        assert!(stack.is_empty());
        assert!(stack.remove_last_command().is_none());
    }
}
