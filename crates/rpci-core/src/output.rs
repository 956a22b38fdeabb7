//! Structured output sinks
//!
//! Rendering code emits through a [`Sink`]: an append-only stream of
//! nested containers, lists and instances, plus scalar fields. The text
//! sink writes the human-readable fragments and discards the structure;
//! the JSON sink does the opposite, collecting fields into a document
//! that is printed on [`Sink::finish`].
//!
//! Opens and closes must be strictly nested. Every `open_*` needs a
//! matching `close_*` with the same name, even when nothing was emitted
//! in between.

use std::io::{self, Write};

use serde_json::{Map, Value};

/// Append-only structured output sink
pub trait Sink {
    /// Attach an identifying attribute to the next opened container or
    /// instance (e.g. a bus number or BDF).
    fn attr(&mut self, key: &str, value: &str);

    /// Open a named container (JSON object)
    fn open_container(&mut self, name: &str);
    /// Close the innermost container
    fn close_container(&mut self, name: &str);

    /// Open a named list (JSON array)
    fn open_list(&mut self, name: &str);
    /// Close the innermost list
    fn close_list(&mut self, name: &str);

    /// Open one instance inside the innermost list
    fn open_instance(&mut self, name: &str);
    /// Close the innermost instance
    fn close_instance(&mut self, name: &str);

    /// Emit human-readable text (padding, labels, separators)
    fn text(&mut self, s: &str);

    /// Emit a scalar field: rendered in text output and recorded under
    /// `key` in structured output
    fn field(&mut self, key: &str, value: &str);

    /// Flush everything to the underlying writer
    fn finish(&mut self) -> io::Result<()>;
}

/// Plain text sink: writes `text` and `field` fragments verbatim
pub struct TextSink<W: Write> {
    out: W,
    buf: String,
}

impl<W: Write> TextSink<W> {
    /// Wrap a writer; nothing is written until [`Sink::finish`]
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: String::new(),
        }
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn attr(&mut self, _key: &str, _value: &str) {}
    fn open_container(&mut self, _name: &str) {}
    fn close_container(&mut self, _name: &str) {}
    fn open_list(&mut self, _name: &str) {}
    fn close_list(&mut self, _name: &str) {}
    fn open_instance(&mut self, _name: &str) {}
    fn close_instance(&mut self, _name: &str) {}

    fn text(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn field(&mut self, _key: &str, value: &str) {
        self.buf.push_str(value);
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.write_all(self.buf.as_bytes())?;
        self.buf.clear();
        self.out.flush()
    }
}

enum Frame {
    Container { name: String, map: Map<String, Value> },
    List { name: String, items: Vec<Value> },
    Instance { name: String, map: Map<String, Value> },
}

/// JSON sink: builds a document from the open/close structure
///
/// Pending attributes become fields of the next opened container or
/// instance, so tagged instances keep their identity in machine output.
/// `text` fragments are dropped.
pub struct JsonSink<W: Write> {
    out: W,
    root: Map<String, Value>,
    stack: Vec<Frame>,
    pending: Vec<(String, String)>,
}

impl<W: Write> JsonSink<W> {
    /// Wrap a writer; the document is written on [`Sink::finish`]
    pub fn new(out: W) -> Self {
        Self {
            out,
            root: Map::new(),
            stack: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn drain_pending(&mut self) -> Map<String, Value> {
        let mut map = Map::new();
        for (k, v) in self.pending.drain(..) {
            map.insert(k, Value::String(v));
        }
        map
    }

    fn attach(&mut self, name: &str, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::List { items, .. }) => items.push(value),
            Some(Frame::Container { map, .. }) | Some(Frame::Instance { map, .. }) => {
                map.insert(name.to_string(), value);
            }
            None => {
                self.root.insert(name.to_string(), value);
            }
        }
    }
}

impl<W: Write> Sink for JsonSink<W> {
    fn attr(&mut self, key: &str, value: &str) {
        self.pending.push((key.to_string(), value.to_string()));
    }

    fn open_container(&mut self, name: &str) {
        let map = self.drain_pending();
        self.stack.push(Frame::Container {
            name: name.to_string(),
            map,
        });
    }

    fn close_container(&mut self, name: &str) {
        match self.stack.pop() {
            Some(Frame::Container { name: opened, map }) => {
                debug_assert_eq!(opened, name, "container close does not match open");
                self.attach(&opened, Value::Object(map));
            }
            other => debug_assert!(other.is_none(), "close_container without open"),
        }
    }

    fn open_list(&mut self, name: &str) {
        self.stack.push(Frame::List {
            name: name.to_string(),
            items: Vec::new(),
        });
    }

    fn close_list(&mut self, name: &str) {
        match self.stack.pop() {
            Some(Frame::List {
                name: opened,
                items,
            }) => {
                debug_assert_eq!(opened, name, "list close does not match open");
                self.attach(&opened, Value::Array(items));
            }
            other => debug_assert!(other.is_none(), "close_list without open"),
        }
    }

    fn open_instance(&mut self, name: &str) {
        let map = self.drain_pending();
        self.stack.push(Frame::Instance {
            name: name.to_string(),
            map,
        });
    }

    fn close_instance(&mut self, name: &str) {
        match self.stack.pop() {
            Some(Frame::Instance { name: opened, map }) => {
                debug_assert_eq!(opened, name, "instance close does not match open");
                self.attach(&opened, Value::Object(map));
            }
            other => debug_assert!(other.is_none(), "close_instance without open"),
        }
    }

    fn text(&mut self, _s: &str) {}

    fn field(&mut self, key: &str, value: &str) {
        match self.stack.last_mut() {
            Some(Frame::Container { map, .. }) | Some(Frame::Instance { map, .. }) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            Some(Frame::List { .. }) => {
                debug_assert!(false, "field emitted directly into a list");
            }
            None => {
                self.root.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        debug_assert!(self.stack.is_empty(), "finish with open frames");
        let doc = Value::Object(std::mem::take(&mut self.root));
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_sink_ignores_structure() {
        let mut buf = Vec::new();
        {
            let mut sink = TextSink::new(&mut buf);
            sink.attr("id", "0000");
            sink.open_container("domain");
            sink.open_list("device");
            sink.open_instance("device");
            sink.field("bdf", "0000:00:1f.0");
            sink.text(" hello\n");
            sink.close_instance("device");
            sink.close_list("device");
            sink.close_container("domain");
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "0000:00:1f.0 hello\n");
    }

    #[test]
    fn test_json_sink_nesting() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonSink::new(&mut buf);
            sink.attr("id", "0000");
            sink.open_container("domain");
            sink.open_list("bus");
            sink.attr("id", "0001");
            sink.open_instance("bus");
            sink.text("ignored");
            sink.open_list("device");
            sink.open_instance("device");
            sink.field("bdf", "0000:01:00.0");
            sink.close_instance("device");
            sink.close_list("device");
            sink.close_instance("bus");
            sink.close_list("bus");
            sink.close_container("domain");
            sink.finish().unwrap();
        }

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["domain"]["id"], "0000");
        let bus = &doc["domain"]["bus"][0];
        assert_eq!(bus["id"], "0001");
        assert_eq!(bus["device"][0]["bdf"], "0000:01:00.0");
        assert!(!String::from_utf8(buf).unwrap().contains("ignored"));
    }

    #[test]
    fn test_json_sink_empty_list() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonSink::new(&mut buf);
            sink.open_container("domain");
            sink.open_list("bus");
            sink.close_list("bus");
            sink.close_container("domain");
            sink.finish().unwrap();
        }
        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["domain"]["bus"], serde_json::json!([]));
    }
}
