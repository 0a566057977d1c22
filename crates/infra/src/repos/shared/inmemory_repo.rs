use kopilka_domain::{Entity, ID};
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

/// Useful functions for creating inmemory repositories

pub fn lock<T>(collection: &Mutex<T>) -> MutexGuard<'_, T> {
    collection.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands out increasing ids like a database sequence, ids are never reused
pub struct IdSequence(AtomicI64);

impl IdSequence {
    pub fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    pub fn next(&self) -> ID {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    collection.push(val.clone());
}

pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> bool {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) => {
            *item = val.clone();
            true
        }
        None => false,
    }
}

pub fn find<T: Clone + Entity>(val_id: ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = lock(collection);
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = lock(collection);
    collection.iter().filter(|item| compare(item)).cloned().collect()
}

pub fn find_first_by<T: Clone, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Option<T> {
    let collection = lock(collection);
    collection.iter().find(|item| compare(item)).cloned()
}

pub fn delete<T: Clone + Entity>(val_id: ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    delete_first_by(collection, |item| item.id() == val_id)
}

pub fn delete_first_by<T: Clone, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> Option<T> {
    let mut collection = lock(collection);
    let index = collection.iter().position(|item| compare(item))?;
    Some(collection.remove(index))
}

pub fn count<T>(collection: &Mutex<Vec<T>>) -> usize {
    lock(collection).len()
}
