use crate::math::fixed::CFix;
use crate::prelude::{StageError, StageResult};

/// Scoped pool of reusable sample buffers. A two-deep pool gives the
/// ping-pong working buffers the Doppler pass moves columns through.
pub struct BufferPool {
    buffers: Vec<Vec<CFix>>,
    max_capacity: usize,
    outstanding: usize,
}

impl BufferPool {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            max_capacity,
            outstanding: 0,
        }
    }

    /// Hands out a zeroed buffer of the requested length, reusing a
    /// released one when available.
    pub fn checkout(&mut self, length: usize) -> StageResult<Vec<CFix>> {
        if self.outstanding >= self.max_capacity {
            return Err(StageError::Internal("buffer pool depleted".into()));
        }
        self.outstanding += 1;
        if let Some(mut buffer) = self.buffers.pop() {
            buffer.clear();
            buffer.resize(length, CFix::ZERO);
            Ok(buffer)
        } else {
            Ok(vec![CFix::ZERO; length])
        }
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, buffer: Vec<CFix>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    pub fn reset(&mut self) {
        self.buffers.clear();
        self.outstanding = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_reuses_released_buffers() {
        let mut pool = BufferPool::with_capacity(2);
        let first = pool.checkout(4).unwrap();
        pool.release(first);
        let second = pool.checkout(8).unwrap();
        assert_eq!(second.len(), 8);
        assert!(second.iter().all(|&s| s == CFix::ZERO));
    }

    #[test]
    fn pool_refuses_checkout_beyond_capacity() {
        let mut pool = BufferPool::with_capacity(2);
        let _a = pool.checkout(4).unwrap();
        let _b = pool.checkout(4).unwrap();
        assert!(pool.checkout(4).is_err());
    }
}
