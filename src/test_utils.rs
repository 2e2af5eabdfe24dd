//! Shared proptest strategies and log capture for unit tests.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tracing::Subscriber;

/// An in-memory log sink shared with a `fmt` subscriber.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Everything written so far.
    pub(crate) fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A DEBUG-level subscriber writing plain text into the returned buffer.
pub(crate) fn capture_logs() -> (impl Subscriber + Send + Sync, CapturedLogs) {
    let captured = CapturedLogs::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (subscriber, captured)
}

/// Text mixing ordinary characters with markup, handlers and scheme fragments.
pub(crate) fn arb_hostile_text() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        prop::string::string_regex("[a-zA-Z0-9 ./:=-]{0,12}").unwrap(),
        Just("<script>".to_string()),
        Just("</script>".to_string()),
        Just("<img src=x onerror=alert(1)>".to_string()),
        Just("JavaScript:".to_string()),
        Just("java".to_string()),
        Just("script:".to_string()),
        Just("DATA:".to_string()),
        Just("vbscript:".to_string()),
        Just(" onload = ".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("  \t\n".to_string()),
        Just("日本語".to_string()),
    ];
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

fn arb_number() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u64>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1e12f64..1e12f64).prop_map(|f| json!(f)),
        prop::string::string_regex("-?[0-9]{0,6}(\\.[0-9]{0,3})?").unwrap().prop_map(Value::from),
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
    ]
}

fn arb_favicon() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("https://example.com/favicon.ico")),
        Just(json!("http://example.com/a.png?x=1")),
        Just(json!("javascript:alert(1)")),
        Just(json!("data:image/png;base64,AAAA")),
        Just(json!("https://example.com/?u=vbscript:x")),
        Just(json!("not a url")),
        Just(json!("no_favicon")),
        Just(Value::Null),
        arb_hostile_text().prop_map(Value::from),
    ]
}

/// A backup element: mostly the right shape, with hostile values and wrong types.
pub(crate) fn arb_raw_record() -> impl Strategy<Value = Value> {
    let day = (arb_hostile_text(), arb_number(), arb_number()).prop_map(|(date, summary, counter)| {
        json!({"date": date, "summary": summary, "counter": counter})
    });
    let days = prop_oneof![
        prop::collection::vec(day, 0..4).prop_map(Value::from),
        Just(Value::Null),
        Just(json!("not a list")),
    ];

    (arb_hostile_text(), arb_number(), arb_number(), arb_favicon(), days).prop_map(
        |(url, summary_time, counter, favicon, days)| {
            let mut map = Map::new();
            map.insert("url".to_string(), Value::from(url));
            map.insert("summaryTime".to_string(), summary_time);
            map.insert("counter".to_string(), counter);
            map.insert("favicon".to_string(), favicon);
            map.insert("days".to_string(), days);
            Value::Object(map)
        },
    )
}

/// Arbitrary JSON, including deep nesting.
pub(crate) fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| json!(f)),
        arb_hostile_text().prop_map(Value::from),
    ];
    leaf.prop_recursive(6, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::from),
            prop::collection::hash_map(
                prop_oneof![
                    Just("url".to_string()),
                    Just("summaryTime".to_string()),
                    Just("days".to_string()),
                    Just("favicon".to_string()),
                    Just("type".to_string()),
                    Just("message".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..6
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}
