// src/pool.rs
//! Reuse of request serialization buffers.
//!
//! Callers acquire a cleared buffer, fill it, and hand it back with
//! `release` once the request is finished. Nothing depends on a buffer
//! actually coming from the pool: an empty pool just allocates.

use crate::constants::{BUFFER_INITIAL_CAPACITY, BUFFER_MAX_RETAINED_CAPACITY, BUFFER_POOL_MAX_IDLE};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static SHARED: Lazy<BufferPool> =
    Lazy::new(|| BufferPool::new(BUFFER_POOL_MAX_IDLE, BUFFER_MAX_RETAINED_CAPACITY));

/// Process-wide pool used by the request executor.
pub fn shared() -> &'static BufferPool {
    &SHARED
}

/// A bounded stack of idle byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
    max_retained_capacity: usize,
}

impl BufferPool {
    pub fn new(max_idle: usize, max_retained_capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
            max_retained_capacity,
        }
    }

    /// Takes an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> Vec<u8> {
        self.idle
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(BUFFER_INITIAL_CAPACITY))
    }

    /// Returns a buffer. Oversized buffers and overflow beyond `max_idle` are dropped.
    pub fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > self.max_retained_capacity {
            return;
        }
        buffer.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buffer);
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}
