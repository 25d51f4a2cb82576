//! Output sinks for the audio producer threads
//!
//! A producer thread renders a block and hands it to `write_block`, which
//! blocks until the block is accepted. That call is what paces the
//! producer to real time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ringbuf::HeapProd;
use ringbuf::traits::{Observer, Producer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("audio sink closed")]
    Closed,
}

/// Destination for interleaved stereo blocks
pub trait AudioSink: Send {
    /// Blocks until `block` has been accepted
    fn write_block(&mut self, block: &[f32]) -> Result<(), SinkError>;
}

/// Discards samples but sleeps for the block's duration
///
/// Stands in for a missing audio device so the producers keep their
/// real-time cadence.
#[derive(Debug, Clone)]
pub struct PacedSilence {
    sample_rate: u32,
}

impl PacedSilence {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl AudioSink for PacedSilence {
    fn write_block(&mut self, block: &[f32]) -> Result<(), SinkError> {
        let frames = block.len() / 2;
        thread::sleep(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64));
        Ok(())
    }
}

/// Feeds a ring buffer drained by the device callback
pub struct RingSink {
    producer: HeapProd<f32>,
    running: Arc<AtomicBool>,
}

impl RingSink {
    pub fn new(producer: HeapProd<f32>, running: Arc<AtomicBool>) -> Self {
        Self { producer, running }
    }
}

impl AudioSink for RingSink {
    fn write_block(&mut self, block: &[f32]) -> Result<(), SinkError> {
        let mut rest = block;
        while !rest.is_empty() {
            if !self.running.load(Ordering::Acquire) {
                return Err(SinkError::Closed);
            }
            if self.producer.vacant_len() == 0 {
                thread::sleep(Duration::from_millis(1));
                continue;
            }
            let pushed = self.producer.push_slice(rest);
            rest = &rest[pushed..];
        }
        Ok(())
    }
}

/// Shared record of blocks written to a `RecordingSink`
pub type BlockLog = Arc<Mutex<Vec<Vec<f32>>>>;

/// Records every block; for driving producers without hardware
#[derive(Debug, Clone)]
pub struct RecordingSink {
    log: BlockLog,
    pace: Duration,
}

impl RecordingSink {
    /// Returns the sink and a handle to its log
    pub fn new(pace: Duration) -> (Self, BlockLog) {
        let log = BlockLog::default();
        (
            Self {
                log: log.clone(),
                pace,
            },
            log,
        )
    }
}

impl AudioSink for RecordingSink {
    fn write_block(&mut self, block: &[f32]) -> Result<(), SinkError> {
        self.log
            .lock()
            .map_err(|_| SinkError::Closed)?
            .push(block.to_vec());
        thread::sleep(self.pace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::HeapRb;
    use ringbuf::traits::{Consumer, Split};

    #[test]
    fn test_ring_sink_waits_for_space() {
        let (producer, mut consumer) = HeapRb::<f32>::new(4).split();
        let running = Arc::new(AtomicBool::new(true));
        let mut sink = RingSink::new(producer, running);

        let writer = thread::spawn(move || sink.write_block(&[1.0; 10]));
        let mut received = Vec::new();
        while received.len() < 10 {
            let mut buf = [0.0; 4];
            let n = consumer.pop_slice(&mut buf);
            received.extend_from_slice(&buf[..n]);
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(writer.join().unwrap(), Ok(()));
        assert!(received.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_ring_sink_closes_when_stopped() {
        let (producer, _consumer) = HeapRb::<f32>::new(2).split();
        let running = Arc::new(AtomicBool::new(false));
        let mut sink = RingSink::new(producer, running);
        assert_eq!(sink.write_block(&[0.0; 8]), Err(SinkError::Closed));
    }

    #[test]
    fn test_recording_sink_logs_blocks() {
        let (mut sink, log) = RecordingSink::new(Duration::ZERO);
        sink.write_block(&[0.5, 0.5]).unwrap();
        sink.write_block(&[0.0, 0.0]).unwrap();
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
