//! Line-oriented input stage.
//!
//! Each line is one token: `exit` (any case) ends the run, a base-10
//! integer is fed to the first filter, anything else is reported and
//! skipped. End of input ends the run the same way `exit` does, minus the
//! `Ended` notification.
//!
//! Reading a line is not a cancellable wait. If the pipeline is cancelled
//! from elsewhere while this stage is blocked on its reader, the stage only
//! notices once the next line arrives.

use crate::pipeline::cancel::CancellationSignal;
use crate::pipeline::sink::{EventSink, PipelineEvent};
use crate::pipeline::stage::{send_or_cancel, StageOutcome};
use crossbeam_channel::Sender;
use std::io::BufRead;
use std::sync::Arc;

/// Classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputToken {
    Exit,
    Value(i64),
    Invalid(String),
}

/// Classify one line. Surrounding whitespace is ignored.
pub fn parse_token(line: &str) -> InputToken {
    let token = line.trim();
    if token.eq_ignore_ascii_case("exit") {
        return InputToken::Exit;
    }
    match token.parse::<i64>() {
        Ok(value) => InputToken::Value(value),
        Err(_) => InputToken::Invalid(token.to_string()),
    }
}

/// Producer stage reading tokens from any buffered reader.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Feed values into `output` until `exit`, end of input, or cancellation.
    /// Raises `cancel` on `exit` and on end of input.
    pub fn run(
        self,
        output: Sender<i64>,
        cancel: CancellationSignal,
        events: Arc<dyn EventSink>,
    ) -> StageOutcome {
        for line in self.reader.lines() {
            if cancel.is_raised() {
                return StageOutcome::Cancelled;
            }

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            };

            match parse_token(&line) {
                InputToken::Exit => {
                    events.emit(PipelineEvent::Ended);
                    cancel.raise();
                    return StageOutcome::Cancelled;
                }
                InputToken::Value(value) => {
                    if let Err(outcome) = send_or_cancel(&output, value, &cancel) {
                        return outcome;
                    }
                }
                InputToken::Invalid(token) => events.emit(PipelineEvent::ParseError(token)),
            }
        }

        tracing::info!("Input closed, shutting down pipeline");
        cancel.raise();
        StageOutcome::UpstreamClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sink::ChannelSink;
    use crossbeam_channel::bounded;
    use std::io::Cursor;
    use std::thread;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("42"), InputToken::Value(42));
        assert_eq!(parse_token("-7"), InputToken::Value(-7));
        assert_eq!(parse_token("+3"), InputToken::Value(3));
        assert_eq!(parse_token("  12\r"), InputToken::Value(12));
        assert_eq!(parse_token("exit"), InputToken::Exit);
        assert_eq!(parse_token("EXIT"), InputToken::Exit);
        assert_eq!(parse_token("eXiT"), InputToken::Exit);
        assert_eq!(parse_token("foo"), InputToken::Invalid("foo".to_string()));
        assert_eq!(parse_token("1.5"), InputToken::Invalid("1.5".to_string()));
        assert_eq!(parse_token(""), InputToken::Invalid(String::new()));
        assert_eq!(parse_token("exit now"), InputToken::Invalid("exit now".to_string()));
    }

    #[test]
    fn test_overflowing_integer_is_invalid() {
        assert!(matches!(
            parse_token("99999999999999999999"),
            InputToken::Invalid(_)
        ));
    }

    #[test]
    fn test_source_feeds_values_and_stops_on_exit() {
        let cancel = CancellationSignal::new();
        let (tx, rx) = bounded(0);
        let (sink, events) = ChannelSink::new();
        let source = LineSource::new(Cursor::new("1\nbar\n2\nExit\n3\n"));

        let remote = cancel.clone();
        let handle = thread::spawn(move || source.run(tx, remote, Arc::new(sink)));

        let values: Vec<i64> = rx.iter().collect();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(handle.join().unwrap(), StageOutcome::Cancelled);
        assert!(cancel.is_raised());

        let events: Vec<_> = events.try_iter().collect();
        assert_eq!(
            events,
            vec![
                PipelineEvent::ParseError("bar".to_string()),
                PipelineEvent::Ended
            ]
        );
    }

    #[test]
    fn test_end_of_input_raises_cancel() {
        let cancel = CancellationSignal::new();
        let (tx, rx) = bounded(0);
        let (sink, events) = ChannelSink::new();
        let source = LineSource::new(Cursor::new("5\n"));

        let remote = cancel.clone();
        let handle = thread::spawn(move || source.run(tx, remote, Arc::new(sink)));

        assert_eq!(rx.recv().unwrap(), 5);
        assert_eq!(handle.join().unwrap(), StageOutcome::UpstreamClosed);
        assert!(cancel.is_raised());
        assert!(events.try_recv().is_err());
    }
}
