use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use verify_move::logging::fmt_layer;

/// Appends written bytes into a shared Vec<u8>.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn json_lines_carry_structured_fields() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let subscriber = registry().with(fmt_layer(true, false, make_writer));

    tracing::subscriber::with_default(subscriber, || {
        info!(files = 2u64, bytes = 5u64, "Found 2 files to move");
        error!(path = "b/c.txt", code = 4u16, kind = "io", "Failed to move file");
    });

    let text = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(lines[0]["fields"]["files"], 2);
    assert_eq!(lines[0]["fields"]["message"], "Found 2 files to move");

    assert_eq!(lines[1]["level"], "ERROR");
    assert_eq!(lines[1]["fields"]["path"], "b/c.txt");
    assert_eq!(lines[1]["fields"]["code"], 4);
    assert_eq!(lines[1]["fields"]["kind"], "io");
    assert!(lines[1]["timestamp"].is_string());
}
