// src/buffer.rs
//
// Bounded moving-average filter for raw moisture readings.
// Damps single-sample sensor noise before any decision logic runs.

use std::collections::VecDeque;

/// Bounded FIFO of the most-recent sensor readings.
///
/// Holds at most `capacity` values; adding a reading at capacity evicts the
/// oldest. The average is recomputed on demand and is exactly `0.0` for an
/// empty buffer.
#[derive(Debug, Clone)]
pub struct SensorBuffer {
    readings: VecDeque<f64>,
    capacity: usize,
}

impl SensorBuffer {
    /// Create a buffer holding up to `capacity` readings (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest if at capacity.
    ///
    /// Accepts any real value; range checks belong to the decision layer.
    pub fn add_reading(&mut self, value: f64) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(value);
    }

    /// Arithmetic mean of the held readings, or 0.0 when empty.
    pub fn average(&self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.readings.iter().sum();
        sum / self.readings.len() as f64
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_averages_to_zero() {
        let buf = SensorBuffer::new(5);
        assert!(buf.is_empty());
        assert_eq!(buf.average(), 0.0);
    }

    #[test]
    fn partial_fill_averages_exactly_what_was_inserted() {
        let mut buf = SensorBuffer::new(5);
        buf.add_reading(10.0);
        buf.add_reading(20.0);
        buf.add_reading(30.0);

        assert_eq!(buf.len(), 3);
        assert!((buf.average() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut buf = SensorBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            buf.add_reading(v);
        }

        // Only the most recent 3 readings contribute: (3 + 4 + 5) / 3.
        assert_eq!(buf.len(), 3);
        assert!((buf.average() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn accepts_out_of_range_readings() {
        let mut buf = SensorBuffer::new(2);
        buf.add_reading(-50.0);
        buf.add_reading(250.0);

        assert!((buf.average() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut buf = SensorBuffer::new(0);
        buf.add_reading(7.0);
        buf.add_reading(9.0);

        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.average(), 9.0);
    }

    #[test]
    fn constant_input_stabilises_at_that_value() {
        let mut buf = SensorBuffer::new(5);
        for _ in 0..12 {
            buf.add_reading(42.5);
            assert!((buf.average() - 42.5).abs() < 1e-12);
        }
        assert_eq!(buf.len(), 5);
    }
}
