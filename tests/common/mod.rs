//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use crossbeam_channel::{unbounded, Receiver, Sender};
use stagepipe::PipelineEvent;
use std::io::{self, BufReader, Read};
use std::time::{Duration, Instant};

/// Upper bound for anything a test waits on
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Reader fed line by line from the test thread, like an interactive stdin.
/// Reports end of input once the sender is dropped.
pub struct ScriptedInput {
    lines: Receiver<String>,
    pending: Vec<u8>,
    pos: usize,
}

impl ScriptedInput {
    pub fn new() -> (Sender<String>, BufReader<Self>) {
        let (tx, rx) = unbounded();
        let input = Self {
            lines: rx,
            pending: Vec::new(),
            pos: 0,
        };
        (tx, BufReader::new(input))
    }
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.pending.len() {
            match self.lines.recv() {
                Ok(line) => {
                    self.pending = format!("{}\n", line).into_bytes();
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Collect events until `done` returns true for the collected list, or time out.
pub fn collect_until<F>(events: &Receiver<PipelineEvent>, mut done: F) -> Vec<PipelineEvent>
where
    F: FnMut(&[PipelineEvent]) -> bool,
{
    let deadline = Instant::now() + test_timeout();
    let mut seen = Vec::new();
    while !done(&seen) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(event) => seen.push(event),
            Err(_) => panic!("timed out waiting for events, saw {:?}", seen),
        }
    }
    seen
}

/// Values from `Processed` events, in order.
pub fn processed_values(events: &[PipelineEvent]) -> Vec<i64> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Processed(v) => Some(*v),
            _ => None,
        })
        .collect()
}
