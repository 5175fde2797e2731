//! Host-agnostic event glue for list items and edit toggles.
//!
//! A host forwards its UI events (with the instant they happened) to these
//! types and gets back an [`Outcome`] describing what changed. Timers and
//! element state are never owned here: click debouncing is driven by the
//! instants the host passes in, and selection state lives in the list's
//! [`SelectionController`].
//!
//! Caller-supplied handlers return a [`Permission`]. A deferred permission is
//! awaited through a [`PermissionGate`]; a host holding the gate can abort
//! every pending check, for instance when the item goes away.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures_util::future::{self, AbortHandle, BoxFuture};
use futures_util::FutureExt;
use listview_core::logging::{span_names, targets};
use parking_lot::Mutex;
use tracing::Instrument;

use super::config::CLICK_EVENT;
use super::controller::ListView;
use crate::error::Result;
use crate::model::{CollectionMutator, Registration, Scope, SelectionController};

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The target was selected.
    Selected,
    /// The target was already selected and got deselected.
    Deselected,
    /// The handler refused the action.
    Denied,
    /// A click arrived within the debounce window of the previous one.
    Suppressed,
    /// The pending permission check was cancelled.
    Cancelled,
    /// Selection is disabled for this list.
    Disabled,
    /// The event is not the configured trigger, or the action changed nothing.
    Ignored,
    /// Edit mode was entered.
    EditModeEntered,
    /// Edit mode was left.
    EditModeLeft,
    /// The item was removed from its collection.
    Removed,
    /// A custom edit handler ran.
    Handled,
}

/// The answer of a caller-supplied handler to "may this action happen?".
pub enum Permission {
    /// Proceed.
    Allow,
    /// Abort the action.
    Deny,
    /// Decided later; `false` aborts the action.
    Deferred(BoxFuture<'static, bool>),
}

impl Permission {
    /// A permission decided by a future.
    pub fn deferred<F>(decision: F) -> Self
    where
        F: Future<Output = bool> + Send + 'static,
    {
        Self::Deferred(decision.boxed())
    }

    /// A permission decided by a fallible future. An error denies.
    pub fn fallible<F, E>(decision: F) -> Self
    where
        F: Future<Output = std::result::Result<bool, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        Self::deferred(decision.map(|result| match result {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::debug!(target: targets::INTERACTION, error = %e, "permission rejected");
                false
            }
        }))
    }

    /// Waits for the decision.
    pub async fn resolve(self) -> bool {
        match self {
            Self::Allow => true,
            Self::Deny => false,
            Self::Deferred(decision) => decision.await,
        }
    }
}

/// Handlers that return nothing allow the action.
impl Default for Permission {
    fn default() -> Self {
        Self::Allow
    }
}

impl From<bool> for Permission {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

impl From<Option<bool>> for Permission {
    fn from(allowed: Option<bool>) -> Self {
        allowed.map_or(Self::Allow, Self::from)
    }
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Deny => f.write_str("Deny"),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Awaits permissions, abortably.
///
/// [`cancel`](Self::cancel) aborts every check pending at that moment. Checks
/// started afterwards run normally.
#[derive(Default)]
pub struct PermissionGate {
    pending: Mutex<HashMap<u64, AbortHandle>>,
    next_id: AtomicU64,
}

struct PendingCheck<'a> {
    gate: &'a PermissionGate,
    id: u64,
}

impl Drop for PendingCheck<'_> {
    fn drop(&mut self) {
        self.gate.pending.lock().remove(&self.id);
    }
}

impl PermissionGate {
    /// Creates a gate with no pending checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `permission`. Returns `None` if the check was cancelled.
    pub async fn check(&self, permission: Permission) -> Option<bool> {
        let decision = match permission {
            Permission::Allow => return Some(true),
            Permission::Deny => return Some(false),
            Permission::Deferred(decision) => decision,
        };

        let (decision, handle) = future::abortable(decision);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().insert(id, handle);
        let _pending = PendingCheck { gate: self, id };

        decision.await.ok()
    }

    /// Aborts every pending check.
    pub fn cancel(&self) {
        let pending: Vec<AbortHandle> = self.pending.lock().drain().map(|(_, h)| h).collect();
        if !pending.is_empty() {
            tracing::debug!(target: targets::INTERACTION, count = pending.len(), "cancelled pending permission checks");
        }
        for handle in pending {
            handle.abort();
        }
    }

    /// Number of checks currently awaiting a decision.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Suppresses triggers that follow the previous one too closely.
///
/// Every trigger, whether it fires or not, restarts the window, so a burst
/// of clicks fires once.
#[derive(Debug)]
pub struct ClickDebouncer {
    window: Duration,
    last: Mutex<Option<Instant>>,
}

impl ClickDebouncer {
    /// Creates a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(None),
        }
    }

    /// The debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a trigger at `at` and returns whether it should fire.
    pub fn should_fire(&self, at: Instant) -> bool {
        let mut last = self.last.lock();
        let fire = match *last {
            None => true,
            Some(previous) => at.saturating_duration_since(previous) >= self.window,
        };
        *last = Some(at);
        fire
    }

    /// Forgets the previous trigger.
    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

/// Select/deselect glue for one item of a list.
///
/// Registers the item's target on creation (unless the list has selection
/// disabled) and deregisters it on drop. A pending trigger borrows the item,
/// so cancelling it goes through the shared [`gate`](Self::gate).
pub struct ItemInteraction<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    target: T,
    selection: SelectionController<T>,
    registration: Option<Registration<T>>,
    select_on: Option<String>,
    debouncer: ClickDebouncer,
    gate: Arc<PermissionGate>,
}

impl<T> ItemInteraction<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// Creates the glue for `target`, registering it with the list's
    /// selection controller.
    pub fn new(view: &ListView<T>, target: T) -> Self {
        let enabled = view.selection_enabled();
        let config = view.config();
        Self {
            registration: enabled.then(|| view.register(target.clone())),
            select_on: enabled.then(|| config.select_on.clone()),
            selection: view.selection().clone(),
            debouncer: ClickDebouncer::new(config.debounce()),
            gate: Arc::new(PermissionGate::new()),
            target,
        }
    }

    /// The item's selection target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The event that toggles selection, or `None` if selection is disabled.
    pub fn select_event(&self) -> Option<&str> {
        self.select_on.as_deref()
    }

    /// Handles an event that happened at `at`.
    ///
    /// A selected target is deselected without consulting `handler`.
    /// Otherwise the handler's permission is awaited and the target selected
    /// unless it was refused.
    pub async fn trigger<F>(&self, event: &str, at: Instant, handler: F) -> Outcome
    where
        F: FnOnce() -> Permission,
    {
        let Some(select_on) = self.select_on.as_deref() else {
            return Outcome::Disabled;
        };
        if event != select_on {
            return Outcome::Ignored;
        }
        if event == CLICK_EVENT && !self.debouncer.should_fire(at) {
            tracing::debug!(target: targets::INTERACTION, event, "suppressed trigger within debounce window");
            return Outcome::Suppressed;
        }

        if self.selection.is_selected(&self.target) {
            self.selection.deselect(&self.target);
            return Outcome::Deselected;
        }

        let span = tracing::trace_span!(target: targets::INTERACTION, span_names::INTERACTION, event);
        match self.gate.check(handler()).instrument(span).await {
            None => Outcome::Cancelled,
            Some(false) => Outcome::Denied,
            Some(true) if self.selection.select(&self.target) => Outcome::Selected,
            Some(true) => Outcome::Ignored,
        }
    }

    /// Aborts a pending permission check.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// Number of permission checks awaiting a decision.
    pub fn pending(&self) -> usize {
        self.gate.pending()
    }

    /// The gate pending checks wait on. Hosts keep it to cancel a trigger
    /// that is still awaiting permission when the item goes away.
    pub fn gate(&self) -> Arc<PermissionGate> {
        Arc::clone(&self.gate)
    }
}

impl<T> Drop for ItemInteraction<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(registration) = &self.registration {
            registration.deregister();
        }
    }
}

impl<T> fmt::Debug for ItemInteraction<T>
where
    T: Clone + Eq + Hash + Send + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemInteraction")
            .field("target", &self.target)
            .field("select_on", &self.select_on)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

/// Edit-mode toggle glue for a list.
pub struct EditModeInteraction<T> {
    selection: SelectionController<T>,
    edit_on: String,
    gate: PermissionGate,
}

impl<T> EditModeInteraction<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// Creates the glue for the list's edit toggle.
    pub fn new(view: &ListView<T>) -> Self {
        Self {
            selection: view.selection().clone(),
            edit_on: view.config().edit_on.clone(),
            gate: PermissionGate::new(),
        }
    }

    /// Handles an event.
    ///
    /// In edit mode the trigger leaves it immediately. Otherwise the
    /// handler's permission is awaited and edit mode entered unless refused.
    pub async fn trigger<F>(&self, event: &str, handler: F) -> Outcome
    where
        F: FnOnce() -> Permission,
    {
        if event != self.edit_on {
            return Outcome::Ignored;
        }
        if self.selection.is_edit_mode() {
            self.selection.toggle_edit_mode();
            return Outcome::EditModeLeft;
        }

        let span = tracing::trace_span!(target: targets::INTERACTION, span_names::INTERACTION, event);
        match self.gate.check(handler()).instrument(span).await {
            None => Outcome::Cancelled,
            Some(false) => Outcome::Denied,
            Some(true) => {
                // another trigger may have entered edit mode while waiting
                if !self.selection.is_edit_mode() {
                    self.selection.toggle_edit_mode();
                }
                Outcome::EditModeEntered
            }
        }
    }

    /// Aborts a pending permission check.
    pub fn cancel(&self) {
        self.gate.cancel();
    }
}

/// What an item's edit control does when triggered.
pub enum ItemEditAction {
    /// Remove the item from its collection.
    Remove(Arc<CollectionMutator>),
    /// Run a host-supplied handler with the item scope.
    Custom(Box<dyn Fn(&Scope) + Send + Sync>),
    /// Do nothing.
    Nothing,
}

impl ItemEditAction {
    /// Resolves the built-in actions named by a host attribute: `delete` and
    /// `remove` remove the item, an empty value does nothing. Any other name
    /// is a host handler and yields `None`.
    pub fn from_attr<T>(value: &str, view: &ListView<T>) -> Option<Self>
    where
        T: Clone + Eq + Hash + Send + 'static,
    {
        match value.trim() {
            "delete" | "remove" => Some(Self::Remove(view.mutator().clone())),
            "" => Some(Self::Nothing),
            _ => None,
        }
    }
}

impl fmt::Debug for ItemEditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove(_) => f.write_str("Remove"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Nothing => f.write_str("Nothing"),
        }
    }
}

/// Edit-control glue for one item of a list.
#[derive(Debug)]
pub struct ItemEditInteraction {
    scope: Scope,
    edit_on: String,
    action: ItemEditAction,
}

impl ItemEditInteraction {
    /// Creates the glue for the item whose scope is `scope`.
    pub fn new<T>(view: &ListView<T>, scope: Scope, action: ItemEditAction) -> Self
    where
        T: Clone + Eq + Hash + Send + 'static,
    {
        Self {
            scope,
            edit_on: view.config().edit_on.clone(),
            action,
        }
    }

    /// The item scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Handles an event.
    ///
    /// # Errors
    ///
    /// Propagates the collection mutator's errors for [`ItemEditAction::Remove`].
    pub fn trigger(&self, event: &str) -> Result<Outcome> {
        if event != self.edit_on {
            return Ok(Outcome::Ignored);
        }
        match &self.action {
            ItemEditAction::Remove(mutator) => Ok(match mutator.remove(&self.scope)? {
                Some(_) => Outcome::Removed,
                None => Outcome::Ignored,
            }),
            ItemEditAction::Custom(handler) => {
                handler(&self.scope);
                Ok(Outcome::Handled)
            }
            ItemEditAction::Nothing => Ok(Outcome::Handled),
        }
    }
}
