//! Selection state for list views.
//!
//! This module provides [`SelectionController`], which arbitrates selection
//! across every target (an element handle, an item scope, any identity
//! token) registered with one list.
//!
//! # Example
//!
//! ```
//! use listview::model::{SelectionController, SelectionMode};
//!
//! let selection = SelectionController::new(SelectionMode::Active);
//! let _a = selection.register("a");
//! let _b = selection.register("b");
//!
//! selection.select(&"a");
//! selection.select(&"b");
//!
//! assert_eq!(selection.selected(), vec!["b"]);
//! assert!(selection.is_active(&"a") && selection.is_active(&"b"));
//!
//! selection.selection_changed().connect(|(selected, deselected)| {
//!     println!("Selection changed: +{} -{}", selected.len(), deselected.len());
//! });
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::{IndexMap, IndexSet};
use listview_core::logging::targets;
use listview_core::Signal;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ListViewError;

/// Selection behavior mode for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Nothing can be selected (default).
    #[default]
    None,
    /// Only one target can be selected at a time.
    Single,
    /// Only one target can be selected at a time, but every selected target
    /// is also marked active, and stays active after another is selected.
    Active,
    /// Any number of targets can be selected.
    Multi,
}

impl SelectionMode {
    /// Resolves a mode from a host attribute value.
    ///
    /// Unknown values disable selection instead of failing.
    pub fn from_attr(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// The lowercase mode name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Active => "active",
            Self::Multi => "multi",
        }
    }

    /// Whether at most one target may be selected.
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Single | Self::Active)
    }
}

impl FromStr for SelectionMode {
    type Err = ListViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "single" => Ok(Self::Single),
            "active" => Ok(Self::Active),
            "multi" => Ok(Self::Multi),
            other => Err(ListViewError::InvalidSelectMode(other.to_string())),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct SelectionState<T> {
    mode: SelectionMode,
    /// Registered targets, in registration order, with the generation of
    /// their live registration.
    registered: IndexMap<T, u64>,
    selected: IndexSet<T>,
    active: IndexSet<T>,
    edit_mode: bool,
    next_generation: u64,
}

struct Shared<T> {
    state: Mutex<SelectionState<T>>,
    selection_changed: Signal<(Vec<T>, Vec<T>)>,
    edit_mode_changed: Signal<bool>,
}

impl<T> Shared<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    fn notify(&self, selected: Vec<T>, deselected: Vec<T>) {
        if !selected.is_empty() || !deselected.is_empty() {
            self.selection_changed.emit((selected, deselected));
        }
    }
}

/// Manages selection and edit-mode state for one list.
///
/// Cloning a `SelectionController` hands out another handle to the same
/// state. Signals are emitted after the state lock is released, so slots may
/// call back into the controller.
///
/// # Signals
///
/// - `selection_changed`: (newly selected, newly deselected) targets
/// - `edit_mode_changed`: the new edit-mode flag
pub struct SelectionController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for SelectionController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Default for SelectionController<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<T> SelectionController<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// Creates a controller with no registered targets.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SelectionState {
                    mode,
                    registered: IndexMap::new(),
                    selected: IndexSet::new(),
                    active: IndexSet::new(),
                    edit_mode: false,
                    next_generation: 0,
                }),
                selection_changed: Signal::new(),
                edit_mode_changed: Signal::new(),
            }),
        }
    }

    // =========================================================================
    // Selection Mode
    // =========================================================================

    /// Gets the current selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.shared.state.lock().mode
    }

    /// Sets the selection mode, trimming the selection to what the new mode
    /// allows.
    ///
    /// - `None`: every target is deselected and active marks are cleared.
    /// - `Single` / `Active`: only the most recently selected target stays
    ///   selected.
    /// - `Multi`: the selection is kept.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        let deselected: Vec<T> = {
            let mut state = self.shared.state.lock();
            state.mode = mode;
            match mode {
                SelectionMode::None => {
                    state.active.clear();
                    state.selected.drain(..).collect()
                }
                SelectionMode::Single | SelectionMode::Active => {
                    let keep = state.selected.len().saturating_sub(1);
                    state.selected.drain(..keep).collect()
                }
                SelectionMode::Multi => Vec::new(),
            }
        };

        tracing::trace!(
            target: targets::SELECTION,
            mode = %mode,
            deselected = deselected.len(),
            "set selection mode"
        );
        self.shared.notify(Vec::new(), deselected);
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a target so that it can be selected.
    ///
    /// Registering a target that is already registered returns another handle
    /// to the existing registration.
    pub fn register(&self, target: T) -> Registration<T> {
        let mut state = self.shared.state.lock();
        let generation = match state.registered.get(&target) {
            Some(&generation) => generation,
            None => {
                let generation = state.next_generation;
                state.next_generation += 1;
                state.registered.insert(target.clone(), generation);
                generation
            }
        };
        tracing::trace!(target: targets::SELECTION, generation, "registered target");

        Registration {
            shared: Arc::downgrade(&self.shared),
            target,
            generation,
            done: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Selection Queries
    // =========================================================================

    /// Checks if a target is registered.
    pub fn is_registered(&self, target: &T) -> bool {
        self.shared.state.lock().registered.contains_key(target)
    }

    /// Checks if a target is selected.
    pub fn is_selected(&self, target: &T) -> bool {
        self.shared.state.lock().selected.contains(target)
    }

    /// Checks if a target is active.
    pub fn is_active(&self, target: &T) -> bool {
        self.shared.state.lock().active.contains(target)
    }

    /// Returns true if any target is selected.
    pub fn has_selection(&self) -> bool {
        !self.shared.state.lock().selected.is_empty()
    }

    /// Returns the number of selected targets.
    pub fn selected_count(&self) -> usize {
        self.shared.state.lock().selected.len()
    }

    /// Returns the registered targets in registration order.
    pub fn registered(&self) -> Vec<T> {
        self.shared.state.lock().registered.keys().cloned().collect()
    }

    /// Returns the selected targets in selection order.
    pub fn selected(&self) -> Vec<T> {
        self.shared.state.lock().selected.iter().cloned().collect()
    }

    /// Returns the active targets in activation order.
    pub fn active(&self) -> Vec<T> {
        self.shared.state.lock().active.iter().cloned().collect()
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Selects a target according to the selection mode.
    ///
    /// - `None`: nothing happens.
    /// - `Single` / `Active`: every other target is deselected first.
    /// - `Active`: the target is also marked active; other active targets stay
    ///   active.
    /// - `Multi`: the target is added to the selection.
    ///
    /// Targets that are not registered are ignored. Returns true if the
    /// selection changed.
    pub fn select(&self, target: &T) -> bool {
        let (newly_selected, newly_deselected) = {
            let mut state = self.shared.state.lock();

            if state.mode == SelectionMode::None {
                return false;
            }
            if !state.registered.contains_key(target) {
                tracing::debug!(target: targets::SELECTION, "ignoring selection of unregistered target");
                return false;
            }

            let mut newly_deselected = Vec::new();
            if state.mode.is_exclusive() {
                state.selected.retain(|other| {
                    let keep = other == target;
                    if !keep {
                        newly_deselected.push(other.clone());
                    }
                    keep
                });
            }

            let mut newly_selected = Vec::new();
            if state.selected.insert(target.clone()) {
                newly_selected.push(target.clone());
            }
            if state.mode == SelectionMode::Active {
                state.active.insert(target.clone());
            }

            (newly_selected, newly_deselected)
        };

        tracing::trace!(
            target: targets::SELECTION,
            selected = newly_selected.len(),
            deselected = newly_deselected.len(),
            "select"
        );
        let changed = !newly_selected.is_empty() || !newly_deselected.is_empty();
        self.shared.notify(newly_selected, newly_deselected);
        changed
    }

    /// Deselects a target, clearing its active mark as well.
    ///
    /// Returns true if the target was selected.
    pub fn deselect(&self, target: &T) -> bool {
        let was_selected = {
            let mut state = self.shared.state.lock();
            state.active.shift_remove(target);
            state.selected.shift_remove(target)
        };

        if was_selected {
            tracing::trace!(target: targets::SELECTION, "deselect");
            self.shared.notify(Vec::new(), vec![target.clone()]);
        }
        was_selected
    }

    /// Deselects every selected target.
    pub fn clear_selection(&self) {
        let deselected: Vec<T> = {
            let mut state = self.shared.state.lock();
            let deselected: Vec<T> = state.selected.drain(..).collect();
            for target in &deselected {
                state.active.shift_remove(target);
            }
            deselected
        };
        self.shared.notify(Vec::new(), deselected);
    }

    // =========================================================================
    // Edit Mode
    // =========================================================================

    /// Returns whether the list is in edit mode.
    pub fn is_edit_mode(&self) -> bool {
        self.shared.state.lock().edit_mode
    }

    /// Flips edit mode and returns the new value.
    pub fn toggle_edit_mode(&self) -> bool {
        let edit_mode = {
            let mut state = self.shared.state.lock();
            state.edit_mode = !state.edit_mode;
            state.edit_mode
        };
        tracing::trace!(target: targets::SELECTION, edit_mode, "toggled edit mode");
        self.shared.edit_mode_changed.emit(edit_mode);
        edit_mode
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted when selection changes. Args: (selected, deselected)
    pub fn selection_changed(&self) -> &Signal<(Vec<T>, Vec<T>)> {
        &self.shared.selection_changed
    }

    /// Emitted when edit mode is toggled. Args: the new flag
    pub fn edit_mode_changed(&self) -> &Signal<bool> {
        &self.shared.edit_mode_changed
    }
}

impl<T> fmt::Debug for SelectionController<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SelectionController")
            .field("mode", &state.mode)
            .field("registered", &state.registered.keys().collect::<Vec<_>>())
            .field("selected", &state.selected)
            .field("active", &state.active)
            .field("edit_mode", &state.edit_mode)
            .finish()
    }
}

/// Handle returned by [`SelectionController::register`].
///
/// Call [`deregister`](Self::deregister) when the target goes away. It is
/// idempotent, and it never removes a later registration of the same target.
pub struct Registration<T> {
    shared: Weak<Shared<T>>,
    target: T,
    generation: u64,
    done: AtomicBool,
}

impl<T> Registration<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// The registered target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Whether this handle has already been used to deregister.
    pub fn is_deregistered(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Removes the target from the controller, along with its selected and
    /// active marks. Later calls are no-ops.
    pub fn deregister(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        let was_selected = {
            let mut state = shared.state.lock();
            if state.registered.get(&self.target) != Some(&self.generation) {
                return;
            }
            state.registered.shift_remove(&self.target);
            state.active.shift_remove(&self.target);
            state.selected.shift_remove(&self.target)
        };

        tracing::trace!(target: targets::SELECTION, generation = self.generation, "deregistered target");
        if was_selected {
            shared.notify(Vec::new(), vec![self.target.clone()]);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("generation", &self.generation)
            .field("done", &self.done.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn controller(mode: SelectionMode) -> SelectionController<&'static str> {
        SelectionController::new(mode)
    }

    #[test]
    fn test_controller_creation() {
        let selection = SelectionController::<u32>::default();
        assert_eq!(selection.selection_mode(), SelectionMode::None);
        assert!(!selection.has_selection());
        assert!(!selection.is_edit_mode());
    }

    #[test]
    fn test_mode_from_attr() {
        assert_eq!(SelectionMode::from_attr("single"), SelectionMode::Single);
        assert_eq!(SelectionMode::from_attr("active"), SelectionMode::Active);
        assert_eq!(SelectionMode::from_attr("multi"), SelectionMode::Multi);
        assert_eq!(SelectionMode::from_attr("bogus"), SelectionMode::None);
        assert_eq!(
            "bogus".parse::<SelectionMode>(),
            Err(ListViewError::InvalidSelectMode("bogus".into()))
        );
        assert_eq!(SelectionMode::Multi.to_string(), "multi");
    }

    #[test]
    fn test_no_selection_mode() {
        let selection = controller(SelectionMode::None);
        let _a = selection.register("a");
        let _b = selection.register("b");

        assert!(!selection.select(&"a"));
        assert!(!selection.select(&"b"));
        assert!(selection.selected().is_empty());
        assert!(selection.active().is_empty());
    }

    #[test]
    fn test_single_selection() {
        let selection = controller(SelectionMode::Single);
        let _a = selection.register("a");
        let _b = selection.register("b");

        selection.select(&"a");
        assert!(selection.is_selected(&"a"));
        assert!(!selection.is_selected(&"b"));

        selection.select(&"b");
        assert_eq!(selection.selected(), vec!["b"]);
        assert!(selection.active().is_empty());
    }

    #[test]
    fn test_single_reselect_is_idempotent() {
        let selection = controller(SelectionMode::Single);
        let _a = selection.register("a");

        assert!(selection.select(&"a"));
        assert!(!selection.select(&"a"));
        assert_eq!(selection.selected(), vec!["a"]);
    }

    #[test]
    fn test_active_selection() {
        let selection = controller(SelectionMode::Active);
        let _a = selection.register("a");
        let _b = selection.register("b");

        selection.select(&"a");
        assert!(selection.is_selected(&"a"));
        assert!(selection.is_active(&"a"));
        assert!(!selection.is_active(&"b"));

        selection.select(&"b");
        assert!(!selection.is_selected(&"a"));
        assert!(selection.is_active(&"a"));
        assert_eq!(selection.selected(), vec!["b"]);
        assert_eq!(selection.active(), vec!["a", "b"]);
    }

    #[test]
    fn test_deselect_clears_activation() {
        let selection = controller(SelectionMode::Active);
        let _a = selection.register("a");

        selection.select(&"a");
        assert!(selection.deselect(&"a"));
        assert!(!selection.is_selected(&"a"));
        assert!(!selection.is_active(&"a"));
        assert!(!selection.deselect(&"a"));
    }

    #[test]
    fn test_multi_selection() {
        let selection = controller(SelectionMode::Multi);
        let _a = selection.register("a");
        let _b = selection.register("b");

        selection.select(&"a");
        selection.select(&"b");
        assert_eq!(selection.selected(), vec!["a", "b"]);
        assert_eq!(selection.selected_count(), 2);
        assert!(selection.active().is_empty());
    }

    #[test]
    fn test_only_registered_targets_are_selectable() {
        let selection = controller(SelectionMode::Single);

        assert!(!selection.select(&"a"));
        assert!(!selection.is_selected(&"a"));

        let _a = selection.register("a");
        assert!(!selection.is_selected(&"a"));
        assert!(selection.select(&"a"));
        assert!(selection.is_selected(&"a"));
    }

    #[test]
    fn test_deregister() {
        let selection = controller(SelectionMode::Multi);
        let _zero = selection.register("zero");
        let one = selection.register("one");
        let _two = selection.register("two");

        one.deregister();
        assert!(one.is_deregistered());
        selection.select(&"one");
        assert!(!selection.has_selection());

        // a second call is a noop
        one.deregister();
        assert_eq!(selection.registered(), vec!["zero", "two"]);

        selection.select(&"zero");
        selection.select(&"one");
        selection.select(&"two");
        assert_eq!(selection.selected(), vec!["zero", "two"]);
    }

    #[test]
    fn test_deregister_removes_selection_and_activation() {
        let selection = controller(SelectionMode::Active);
        let a = selection.register("a");

        selection.select(&"a");
        a.deregister();
        assert!(!selection.is_selected(&"a"));
        assert!(!selection.is_active(&"a"));
        assert!(!selection.is_registered(&"a"));
    }

    #[test]
    fn test_stale_registration_keeps_new_one() {
        let selection = controller(SelectionMode::Single);
        let first = selection.register("a");
        first.deregister();

        let _second = selection.register("a");
        first.deregister();
        assert!(selection.is_registered(&"a"));
    }

    #[test]
    fn test_deregister_after_controller_dropped() {
        let selection = controller(SelectionMode::Single);
        let a = selection.register("a");
        drop(selection);
        a.deregister();
        assert!(a.is_deregistered());
    }

    #[test]
    fn test_clear_selection() {
        let selection = controller(SelectionMode::Multi);
        let _a = selection.register("a");
        let _b = selection.register("b");

        selection.select(&"a");
        selection.select(&"b");
        selection.clear_selection();
        assert!(!selection.has_selection());

        let selection = controller(SelectionMode::Active);
        let _a = selection.register("a");
        let _b = selection.register("b");
        selection.select(&"a");
        selection.select(&"b");
        assert_eq!(selection.active(), vec!["a", "b"]);

        selection.clear_selection();
        assert!(!selection.has_selection());
        // only the selected target loses its active mark
        assert_eq!(selection.active(), vec!["a"]);
    }

    #[test]
    fn test_mode_change_trims_selection() {
        let selection = controller(SelectionMode::Multi);
        let _a = selection.register("a");
        let _b = selection.register("b");
        let _c = selection.register("c");
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        selection.selection_changed().connect(move |(selected, deselected)| {
            recv.lock().push((selected.clone(), deselected.clone()));
        });

        selection.select(&"a");
        selection.select(&"b");
        selection.select(&"c");
        events.lock().clear();

        selection.set_selection_mode(SelectionMode::Multi);
        assert_eq!(selection.selected_count(), 3);

        selection.set_selection_mode(SelectionMode::Single);
        assert_eq!(selection.selected(), vec!["c"]);

        selection.set_selection_mode(SelectionMode::Active);
        assert_eq!(selection.selected(), vec!["c"]);
        selection.select(&"a");
        assert_eq!(selection.selected(), vec!["a"]);
        assert_eq!(selection.active(), vec!["a"]);

        selection.set_selection_mode(SelectionMode::None);
        assert!(!selection.has_selection());
        assert!(selection.active().is_empty());
        assert!(!selection.select(&"b"));

        assert_eq!(
            *events.lock(),
            vec![
                (vec![], vec!["a", "b"]),
                (vec!["a"], vec!["c"]),
                (vec![], vec!["a"]),
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_handles() {
        let selection = controller(SelectionMode::Single);
        let first = selection.register("a");
        let second = selection.register("a");
        assert_eq!(selection.registered(), vec!["a"]);

        selection.select(&"a");
        second.deregister();
        assert!(!selection.is_registered(&"a"));
        assert!(!selection.has_selection());

        // the other handle finds nothing left to remove
        first.deregister();
        assert!(first.is_deregistered());
        assert!(selection.registered().is_empty());
    }

    #[test]
    fn test_selection_signal() {
        let selection = controller(SelectionMode::Single);
        let _a = selection.register("a");
        let _b = selection.register("b");

        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        selection.selection_changed().connect(move |(selected, deselected)| {
            recv.lock().push((selected.clone(), deselected.clone()));
        });

        selection.select(&"a");
        selection.select(&"a");
        selection.select(&"b");
        selection.deselect(&"b");

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                (vec!["a"], vec![]),
                (vec!["b"], vec!["a"]),
                (vec![], vec!["b"]),
            ]
        );
    }

    #[test]
    fn test_slot_can_call_back_into_controller() {
        let selection = controller(SelectionMode::Multi);
        let _a = selection.register("a");

        let observed = Arc::new(AtomicUsize::new(0));
        let recv = observed.clone();
        let handle = selection.clone();
        selection.selection_changed().connect(move |_| {
            recv.store(handle.selected_count(), Ordering::SeqCst);
        });

        selection.select(&"a");
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_toggle_edit_mode() {
        let selection = controller(SelectionMode::None);
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let recv = toggles.clone();
        selection.edit_mode_changed().connect(move |&on| recv.lock().push(on));

        assert!(selection.toggle_edit_mode());
        assert!(selection.is_edit_mode());
        assert!(!selection.toggle_edit_mode());
        assert_eq!(*toggles.lock(), vec![true, false]);
    }
}
