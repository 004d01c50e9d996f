//! JSON Event Sink
//!
//! Outputs deploy and provision events as NDJSON for CI/automation consumption.

use crate::application::provision::ProvisionEvent;
use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }

    /// Report a provisioning notification
    pub fn on_provision(&self, event: &ProvisionEvent) {
        let json = match event {
            ProvisionEvent::ImageReady { image_id } => serde_json::json!({
                "event": "image_ready",
                "command": "deploy",
                "image_id": image_id,
            }),
            ProvisionEvent::Progress { status } => serde_json::json!({
                "event": "provision_progress",
                "command": "deploy",
                "status": status,
            }),
            ProvisionEvent::MachineReady { address } => serde_json::json!({
                "event": "machine_ready",
                "command": "deploy",
                "address": address,
            }),
            ProvisionEvent::Failed { message } => serde_json::json!({
                "event": "provision_error",
                "command": "deploy",
                "error": message,
            }),
            ProvisionEvent::TimedOut {
                image_id,
                droplet_id,
            } => serde_json::json!({
                "event": "timeout",
                "command": "deploy",
                "image_id": image_id,
                "droplet_id": droplet_id,
            }),
        };

        self.write_event(json);
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::Started { step_count } => serde_json::json!({
                "event": "start",
                "command": "deploy",
                "step_count": step_count,
            }),

            DeployEvent::StepStarted { index, label } => serde_json::json!({
                "event": "step_start",
                "command": "deploy",
                "index": index,
                "label": label,
            }),

            DeployEvent::StepSucceeded {
                index,
                message,
                output,
            } => serde_json::json!({
                "event": "step_done",
                "command": "deploy",
                "index": index,
                "message": message,
                "output": lossy(&output),
            }),

            DeployEvent::StepFailed {
                index,
                command,
                output,
            } => serde_json::json!({
                "event": "step_error",
                "command": "deploy",
                "index": index,
                "step": command,
                "output": lossy(&output),
            }),

            DeployEvent::HookSucceeded { label, output } => serde_json::json!({
                "event": "hook_done",
                "command": "deploy",
                "label": label,
                "output": lossy(&output),
            }),

            DeployEvent::HookFailed { label, output } => serde_json::json!({
                "event": "hook_error",
                "command": "deploy",
                "label": label,
                "output": lossy(&output),
            }),

            DeployEvent::Completed { executed, success } => serde_json::json!({
                "event": "complete",
                "command": "deploy",
                "status": if success { "success" } else { "failed" },
                "executed": executed,
            }),
        };

        self.write_event(json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    buffer: buffer.clone(),
                },
                buffer,
            )
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<serde_json::Value> {
        String::from_utf8(buffer.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn json_sink_outputs_one_line_per_event() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_event(DeployEvent::Started { step_count: 5 });
        sink.on_event(DeployEvent::StepStarted {
            index: 0,
            label: "Running: run make".to_string(),
        });

        let events = lines(&buffer);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "start");
        assert_eq!(events[0]["step_count"], 5);
        assert_eq!(events[1]["label"], "Running: run make");
    }

    #[test]
    fn json_sink_outputs_failure_status() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_event(DeployEvent::StepFailed {
            index: 3,
            command: "cd /tmp/apker && make".to_string(),
            output: b"make: *** No rule\n".to_vec(),
        });
        sink.on_event(DeployEvent::Completed {
            executed: 3,
            success: false,
        });

        let events = lines(&buffer);
        assert_eq!(events[0]["event"], "step_error");
        assert_eq!(events[0]["output"], "make: *** No rule\n");
        assert_eq!(events[1]["status"], "failed");
    }

    #[test]
    fn json_sink_outputs_provision_timeout() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_provision(&ProvisionEvent::TimedOut {
            image_id: Some(12),
            droplet_id: None,
        });

        let events = lines(&buffer);
        assert_eq!(events[0]["event"], "timeout");
        assert_eq!(events[0]["image_id"], 12);
        assert!(events[0]["droplet_id"].is_null());
    }
}
