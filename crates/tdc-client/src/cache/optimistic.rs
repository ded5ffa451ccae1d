//! Optimistic list views.
//!
//! Local edits are applied to the list before the server confirms them and
//! reverted if the request fails. Every edit and every fetch draws a stamp
//! from the same monotonic clock; a fetch response only replaces entities
//! whose last local edit is older than the fetch and not still pending, and
//! a response older than one already applied is discarded.

use super::diff::json_diff;
use crate::error::ClientError;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use tdc_types::{Message, Notification, Ticket, UserProfile};
use tokio::sync::watch;
use uuid::Uuid;

/// Anything that can live in an [`OptimisticList`].
pub trait Entity: Clone + Serialize + Send + 'static {
    /// Server-assigned identifier.
    fn entity_id(&self) -> i64;
}

impl Entity for Notification {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Entity for Ticket {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Entity for UserProfile {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Entity for Message {
    fn entity_id(&self) -> i64 {
        self.id
    }
}

/// Where a locally created entity is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SlotKey {
    Server(i64),
    Temp(Uuid),
}

#[derive(Debug, Clone)]
struct Slot<T> {
    key: SlotKey,
    value: T,
    /// Last copy the server confirmed.
    confirmed: Option<T>,
    stamp: u64,
    pending: bool,
    position: Position,
}

impl<T: Entity> Slot<T> {
    fn confirmed(value: T, stamp: u64, position: Position) -> Self {
        Self {
            key: SlotKey::Server(value.entity_id()),
            confirmed: Some(value.clone()),
            value,
            stamp,
            pending: false,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tombstone {
    Pending,
    Confirmed(u64),
}

/// Issued when a fetch starts; pass it back to [`OptimisticList::apply_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchStamp(u64);

/// Handle to a locally created entity awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCreate {
    temp: Uuid,
}

/// A local edit awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingUpdate<T> {
    pub id: i64,
    /// Fields that differ from the last server copy.
    pub diff: Map<String, Value>,
    snapshot: T,
    stamp: u64,
}

impl<T> PendingUpdate<T> {
    /// Last server-confirmed copy.
    pub const fn snapshot(&self) -> &T {
        &self.snapshot
    }
}

struct ListState<T> {
    slots: Vec<Slot<T>>,
    clock: u64,
    /// Issue stamp of the newest fetch merged so far.
    applied_fetch: u64,
    tombstones: HashMap<i64, Tombstone>,
    removed: HashMap<i64, (usize, Slot<T>)>,
    next_temp_id: i64,
}

impl<T: Entity> ListState<T> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn server_index(&self, id: i64) -> Option<usize> {
        self.slots.iter().position(|s| s.key == SlotKey::Server(id))
    }

    fn temp_index(&self, temp: Uuid) -> Option<usize> {
        self.slots.iter().position(|s| s.key == SlotKey::Temp(temp))
    }
}

/// A list view with optimistic create, update and delete.
pub struct OptimisticList<T: Entity> {
    state: Mutex<ListState<T>>,
    version: watch::Sender<u64>,
}

impl<T: Entity> Default for OptimisticList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> OptimisticList<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: Mutex::new(ListState {
                slots: Vec::new(),
                clock: 0,
                applied_fetch: 0,
                tombstones: HashMap::new(),
                removed: HashMap::new(),
                next_temp_id: 0,
            }),
            version,
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        let list = Self::new();
        list.replace_all(items);
        list
    }

    // ===== reads =====

    pub fn items(&self) -> Vec<T> {
        self.state.lock().slots.iter().map(|s| s.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().slots.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<T> {
        let state = self.state.lock();
        state.server_index(id).map(|i| state.slots[i].value.clone())
    }

    /// Local edits not yet confirmed or rolled back.
    pub fn pending_count(&self) -> usize {
        let state = self.state.lock();
        state.slots.iter().filter(|s| s.pending).count() + state.removed.len()
    }

    /// Receiver bumped on every change, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Unique negative id for locally synthesized children (e.g. chat messages).
    pub fn next_temp_id(&self) -> i64 {
        let mut state = self.state.lock();
        state.next_temp_id -= 1;
        state.next_temp_id
    }

    fn changed(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    // ===== background refresh =====

    /// Stamp a fetch at the moment its request is issued.
    pub fn begin_fetch(&self) -> FetchStamp {
        FetchStamp(self.state.lock().tick())
    }

    /// Merge a fetch response issued at `stamp`.
    ///
    /// Entities edited locally after `stamp`, or still pending, keep their
    /// local value. Pending creates survive; pending or recent deletes are
    /// not resurrected; anything else absent from the response is dropped.
    /// A response issued before one already merged is ignored.
    pub fn apply_fetch(&self, stamp: FetchStamp, items: Vec<T>) {
        let mut state = self.state.lock();
        let fetched_at = stamp.0;
        if fetched_at < state.applied_fetch {
            tracing::debug!(
                "Discarding fetch #{} (already applied #{})",
                fetched_at,
                state.applied_fetch
            );
            return;
        }
        state.applied_fetch = fetched_at;

        state.tombstones.retain(|_, t| match t {
            Tombstone::Pending => true,
            Tombstone::Confirmed(at) => *at > fetched_at,
        });

        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut local: HashMap<i64, Slot<T>> = HashMap::new();
        for slot in std::mem::take(&mut state.slots) {
            match slot.key {
                SlotKey::Temp(_) => match slot.position {
                    Position::Front => front.push(slot),
                    Position::Back => back.push(slot),
                },
                SlotKey::Server(id) => {
                    local.insert(id, slot);
                },
            }
        }

        let mut merged = Vec::with_capacity(items.len());
        for item in items {
            let id = item.entity_id();
            if state.tombstones.contains_key(&id) {
                continue;
            }
            match local.remove(&id) {
                Some(slot) if slot.pending || slot.stamp > fetched_at => merged.push(slot),
                _ => merged.push(Slot::confirmed(item, fetched_at, Position::Back)),
            }
        }

        let mut kept: Vec<Slot<T>> =
            local.into_values().filter(|s| s.pending || s.stamp > fetched_at).collect();
        kept.sort_by_key(|s| s.stamp);
        for slot in kept {
            match slot.position {
                Position::Front => front.push(slot),
                Position::Back => back.push(slot),
            }
        }

        front.extend(merged);
        front.extend(back);
        state.slots = front;
        drop(state);
        self.changed();
    }

    /// Replace the contents with an authoritative list.
    pub fn replace_all(&self, items: Vec<T>) {
        let stamp = self.begin_fetch();
        self.apply_fetch(stamp, items);
    }

    // ===== create =====

    /// Show `local` immediately under a temporary key.
    pub fn begin_create(&self, local: T, position: Position) -> PendingCreate {
        let temp = Uuid::new_v4();
        let mut state = self.state.lock();
        let stamp = state.tick();
        let slot = Slot {
            key: SlotKey::Temp(temp),
            value: local,
            confirmed: None,
            stamp,
            pending: true,
            position,
        };
        match position {
            Position::Front => state.slots.insert(0, slot),
            Position::Back => state.slots.push(slot),
        }
        drop(state);
        self.changed();
        PendingCreate { temp }
    }

    /// Replace the temporary entity with the server's copy.
    ///
    /// If a refetch already delivered the server copy, the temporary entity is
    /// dropped instead so the entity never appears twice.
    pub fn confirm_create(&self, pending: PendingCreate, server: T) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let temp_index = state.temp_index(pending.temp);
        let position = temp_index.map_or(Position::Back, |i| state.slots[i].position);
        let slot = Slot::confirmed(server, stamp, position);

        match (temp_index, state.server_index(slot.value.entity_id())) {
            (Some(temp), Some(existing)) => {
                state.slots[existing] = slot;
                state.slots.remove(temp);
            },
            (Some(temp), None) => state.slots[temp] = slot,
            (None, Some(existing)) => state.slots[existing] = slot,
            (None, None) => match position {
                Position::Front => state.slots.insert(0, slot),
                Position::Back => state.slots.push(slot),
            },
        }
        drop(state);
        self.changed();
    }

    /// Remove the temporary entity. Returns it if it was still present.
    pub fn rollback_create(&self, pending: PendingCreate) -> Option<T> {
        let mut state = self.state.lock();
        let index = state.temp_index(pending.temp)?;
        let slot = state.slots.remove(index);
        drop(state);
        self.changed();
        Some(slot.value)
    }

    // ===== update =====

    /// Apply `edited` locally. Returns the diff against the last server copy.
    pub fn begin_update(&self, id: i64, edited: T) -> Option<PendingUpdate<T>> {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let index = state.server_index(id)?;
        let slot = &mut state.slots[index];
        let snapshot = slot.confirmed.clone().unwrap_or_else(|| slot.value.clone());
        let diff = json_diff(&snapshot, &edited);
        slot.value = edited;
        slot.pending = true;
        slot.stamp = stamp;
        drop(state);
        self.changed();
        Some(PendingUpdate { id, diff, snapshot, stamp })
    }

    /// Adopt the server copy. If the entity was edited again since `pending`
    /// began, the newer edit stays visible and pending.
    pub fn confirm_update(&self, pending: &PendingUpdate<T>, server: T) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let Some(index) = state.server_index(pending.id) else {
            return;
        };
        let slot = &mut state.slots[index];
        if slot.stamp == pending.stamp {
            slot.value = server.clone();
            slot.pending = false;
            slot.stamp = stamp;
        }
        slot.confirmed = Some(server);
        drop(state);
        self.changed();
    }

    /// Restore the last server copy, unless a newer edit has replaced the
    /// value since `pending` began.
    pub fn rollback_update(&self, pending: &PendingUpdate<T>) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let Some(index) = state.server_index(pending.id) else {
            return;
        };
        let slot = &mut state.slots[index];
        if slot.stamp != pending.stamp {
            return;
        }
        slot.value = slot.confirmed.clone().unwrap_or_else(|| pending.snapshot.clone());
        slot.pending = false;
        slot.stamp = stamp;
        drop(state);
        self.changed();
    }

    // ===== delete =====

    /// Hide the entity immediately. Returns it if it was present.
    pub fn begin_delete(&self, id: i64) -> Option<T> {
        let mut state = self.state.lock();
        let index = state.server_index(id)?;
        let slot = state.slots.remove(index);
        let value = slot.value.clone();
        state.tombstones.insert(id, Tombstone::Pending);
        state.removed.insert(id, (index, slot));
        drop(state);
        self.changed();
        Some(value)
    }

    pub fn confirm_delete(&self, id: i64) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        state.removed.remove(&id);
        state.tombstones.insert(id, Tombstone::Confirmed(stamp));
    }

    /// Put the entity back where it was. Returns whether anything was restored.
    pub fn rollback_delete(&self, id: i64) -> bool {
        let mut state = self.state.lock();
        let stamp = state.tick();
        state.tombstones.remove(&id);
        let Some((index, mut slot)) = state.removed.remove(&id) else {
            return false;
        };
        slot.stamp = stamp;
        slot.pending = false;
        let index = index.min(state.slots.len());
        state.slots.insert(index, slot);
        drop(state);
        self.changed();
        true
    }

    // ===== in-place edits =====

    /// Edit an entity locally and mark it pending. Returns the previous value.
    pub fn modify(&self, id: i64, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let index = state.server_index(id)?;
        let slot = &mut state.slots[index];
        let previous = slot.value.clone();
        f(&mut slot.value);
        slot.pending = true;
        slot.stamp = stamp;
        drop(state);
        self.changed();
        Some(previous)
    }

    /// Finish a pending edit; the result becomes the server-confirmed copy.
    pub fn settle(&self, id: i64, f: impl FnOnce(&mut T)) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let Some(index) = state.server_index(id) else {
            return;
        };
        let slot = &mut state.slots[index];
        f(&mut slot.value);
        slot.confirmed = Some(slot.value.clone());
        slot.pending = false;
        slot.stamp = stamp;
        drop(state);
        self.changed();
    }

    /// Abandon a pending edit, restoring `previous`.
    pub fn restore(&self, id: i64, previous: T) {
        let mut state = self.state.lock();
        let stamp = state.tick();
        let Some(index) = state.server_index(id) else {
            return;
        };
        let slot = &mut state.slots[index];
        slot.value = previous;
        slot.pending = false;
        slot.stamp = stamp;
        drop(state);
        self.changed();
    }
}

// ===== drivers =====

/// Show `local` at `position`, await `request`, then confirm or roll back.
pub async fn create<T, Fut>(
    list: &OptimisticList<T>,
    local: T,
    position: Position,
    request: Fut,
) -> Result<T, ClientError>
where
    T: Entity,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let pending = list.begin_create(local, position);
    match request.await {
        Ok(server) => {
            list.confirm_create(pending, server.clone());
            Ok(server)
        },
        Err(e) => {
            tracing::warn!("Optimistic create rolled back: {}", e);
            list.rollback_create(pending);
            Err(ClientError::rollback(e))
        },
    }
}

/// Apply `edited` locally, send only the changed fields, then confirm or roll back.
pub async fn update<T, F, Fut>(
    list: &OptimisticList<T>,
    id: i64,
    edited: T,
    request: F,
) -> Result<T, ClientError>
where
    T: Entity,
    F: FnOnce(Map<String, Value>) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let pending = list
        .begin_update(id, edited)
        .ok_or_else(|| ClientError::NotFound(format!("entity {} is not in the list", id)))?;
    if pending.diff.is_empty() {
        list.rollback_update(&pending);
        return Ok(pending.snapshot);
    }

    match request(pending.diff.clone()).await {
        Ok(server) => {
            list.confirm_update(&pending, server.clone());
            Ok(server)
        },
        Err(e) => {
            tracing::warn!("Optimistic update of {} rolled back: {}", id, e);
            list.rollback_update(&pending);
            Err(ClientError::rollback(e))
        },
    }
}

/// Hide the entity, await `request`, then confirm or re-insert it.
pub async fn delete<T, Fut>(
    list: &OptimisticList<T>,
    id: i64,
    request: Fut,
) -> Result<(), ClientError>
where
    T: Entity,
    Fut: Future<Output = Result<(), ClientError>>,
{
    if list.begin_delete(id).is_none() {
        return Err(ClientError::NotFound(format!("entity {} is not in the list", id)));
    }
    match request.await {
        Ok(()) => {
            list.confirm_delete(id);
            Ok(())
        },
        Err(e) => {
            tracing::warn!("Optimistic delete of {} rolled back: {}", id, e);
            list.rollback_delete(id);
            Err(ClientError::rollback(e))
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn note(id: i64, title: &str) -> Notification {
        Notification {
            id,
            title: title.to_string(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn ids(list: &OptimisticList<Notification>) -> Vec<i64> {
        list.items().iter().map(|n| n.id).collect()
    }

    fn server_down() -> ClientError {
        ClientError::ServerError { status: 503, message: "unavailable".to_string() }
    }

    #[tokio::test]
    async fn test_create_confirmed_adds_exactly_one() {
        let list = OptimisticList::from_items(vec![note(1, "a"), note(2, "b")]);

        let created =
            create(&list, note(0, "c"), Position::Front, async { Ok(note(3, "c")) }).await.unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(ids(&list), vec![3, 1, 2]);
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_create_after_poll_delivered_it_has_no_duplicate() {
        let list = OptimisticList::from_items(vec![note(1, "a")]);
        let pending = list.begin_create(note(0, "b"), Position::Back);

        // a refetch lands before the create response
        list.replace_all(vec![note(1, "a"), note(2, "b")]);
        assert_eq!(list.len(), 3, "temp entity survives the refetch");

        list.confirm_create(pending, note(2, "b"));
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_create_rejected_rolls_back() {
        let list = OptimisticList::from_items(vec![note(1, "a")]);

        let err = create(&list, note(0, "b"), Position::Front, async { Err(server_down()) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rollback);
        assert_eq!(ids(&list), vec![1]);
    }

    #[tokio::test]
    async fn test_delete_rejected_restores_original_list() {
        let list = OptimisticList::from_items(vec![note(1, "a"), note(2, "b"), note(3, "c")]);

        let err = delete(&list, 2, async { Err(server_down()) }).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rollback);
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(list.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_entity() {
        let list = OptimisticList::from_items(vec![note(1, "a")]);
        let err = delete(&list, 9, async { Ok(()) }).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_sends_diff_and_rolls_back() {
        let list = OptimisticList::from_items(vec![note(1, "draft")]);
        let mut edited = list.get(1).unwrap();
        edited.title = "final".to_string();

        let err = update(&list, 1, edited, |diff| async move {
            assert_eq!(diff.len(), 1);
            assert_eq!(diff["title"], Value::String("final".to_string()));
            Err::<Notification, _>(server_down())
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rollback);
        assert_eq!(list.get(1).unwrap().title, "draft");
    }

    #[tokio::test]
    async fn test_update_without_changes_skips_request() {
        let list = OptimisticList::from_items(vec![note(1, "same")]);
        let unchanged = list.get(1).unwrap();

        let mut sent = false;
        let result = update(&list, 1, unchanged, |_| {
            sent = true;
            async { Ok(note(1, "x")) }
        })
        .await
        .unwrap();

        assert!(!sent, "no request for an empty diff");
        assert_eq!(result.title, "same");
        assert_eq!(list.pending_count(), 0);
    }

    #[test]
    fn test_stale_fetch_does_not_clobber_newer_edit() {
        let list = OptimisticList::from_items(vec![note(1, "old")]);
        let fetch = list.begin_fetch();

        let mut edited = list.get(1).unwrap();
        edited.title = "new".to_string();
        let pending = list.begin_update(1, edited.clone()).unwrap();
        list.confirm_update(&pending, edited);

        // response issued before the edit still carries the old title
        list.apply_fetch(fetch, vec![note(1, "old")]);
        assert_eq!(list.get(1).unwrap().title, "new");

        // a fetch issued after the edit wins
        list.replace_all(vec![note(1, "server")]);
        assert_eq!(list.get(1).unwrap().title, "server");
    }

    #[test]
    fn test_stale_fetch_does_not_resurrect_deleted() {
        let list = OptimisticList::from_items(vec![note(1, "a"), note(2, "b")]);
        let fetch = list.begin_fetch();

        list.begin_delete(2).unwrap();
        list.apply_fetch(fetch, vec![note(1, "a"), note(2, "b")]);
        assert_eq!(ids(&list), vec![1]);

        list.confirm_delete(2);
        let stale = FetchStamp(fetch.0);
        list.apply_fetch(stale, vec![note(1, "a"), note(2, "b")]);
        assert_eq!(ids(&list), vec![1]);

        // once a fetch issued after confirmation arrives the tombstone is gone
        list.replace_all(vec![note(1, "a")]);
        assert_eq!(ids(&list), vec![1]);
        list.replace_all(vec![note(1, "a"), note(2, "b")]);
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn test_out_of_order_fetches_keep_newest() {
        let list = OptimisticList::from_items(vec![note(1, "a"), note(2, "b")]);
        let older = list.begin_fetch();
        let newer = list.begin_fetch();

        list.apply_fetch(newer, vec![note(1, "a")]);
        list.apply_fetch(older, vec![note(1, "a"), note(2, "b")]);

        assert_eq!(ids(&list), vec![1]);
    }

    #[test]
    fn test_overlapping_updates_keep_latest_edit() {
        let list = OptimisticList::from_items(vec![note(1, "draft")]);
        let mut first = list.get(1).unwrap();
        first.title = "first".to_string();
        let first = list.begin_update(1, first).unwrap();
        let mut second = list.get(1).unwrap();
        second.title = "second".to_string();
        let second = list.begin_update(1, second).unwrap();

        // the earlier request fails while the later one is still in flight
        list.rollback_update(&first);
        assert_eq!(list.get(1).unwrap().title, "second");
        assert_eq!(list.pending_count(), 1);

        list.confirm_update(&second, note(1, "second"));
        assert_eq!(list.get(1).unwrap().title, "second");
        assert_eq!(list.pending_count(), 0);
    }

    #[test]
    fn test_earlier_confirm_does_not_hide_later_edit() {
        let list = OptimisticList::from_items(vec![note(1, "draft")]);
        let mut first = list.get(1).unwrap();
        first.title = "first".to_string();
        let first = list.begin_update(1, first).unwrap();
        let mut second = list.get(1).unwrap();
        second.title = "second".to_string();
        let second = list.begin_update(1, second).unwrap();

        list.confirm_update(&first, note(1, "first"));
        assert_eq!(list.get(1).unwrap().title, "second");
        assert_eq!(list.pending_count(), 1);

        list.rollback_update(&second);
        assert_eq!(list.get(1).unwrap().title, "first");
        assert_eq!(list.pending_count(), 0);
    }

    #[test]
    fn test_fetch_drops_entities_deleted_elsewhere() {
        let list = OptimisticList::from_items(vec![note(1, "a"), note(2, "b")]);
        list.replace_all(vec![note(2, "b")]);
        assert_eq!(ids(&list), vec![2]);
    }

    #[test]
    fn test_modify_settle_restore() {
        let list = OptimisticList::from_items(vec![note(1, "a")]);

        let previous = list.modify(1, |n| n.title = "b".to_string()).unwrap();
        assert_eq!(previous.title, "a");
        assert_eq!(list.pending_count(), 1);

        list.restore(1, previous);
        assert_eq!(list.get(1).unwrap().title, "a");

        list.modify(1, |n| n.title = "c".to_string());
        list.settle(1, |_| {});
        assert_eq!(list.get(1).unwrap().title, "c");
        assert_eq!(list.pending_count(), 0);
    }

    #[test]
    fn test_subscribe_bumps_on_change() {
        let list = OptimisticList::from_items(vec![note(1, "a")]);
        let mut rx = list.subscribe();
        list.begin_delete(1);
        assert!(rx.has_changed().unwrap());
        assert!(list.next_temp_id() < 0);
    }
}
