// SPDX-License-Identifier: MIT

//! Shadow document projection (spec §3, §4.5 step 9, §9 design note:
//! "implement as a pure filter function over the working document tree").

use serde_json::{Map, Value};

use crate::document::ProvisioningDocument;

/// Per-section keys exposed in the shadow file; everything else inside a
/// section (plugin source, opaque payload) is stripped as potentially
/// sensitive.
const SECTION_WHITELIST: [&str; 9] = [
    "ignore-result",
    "reboot-on-success",
    "reboot-on-failure",
    "halt-on-failure",
    "description",
    "timestamp",
    "status",
    "start-timestamp",
    "error",
];

/// Build the shadow projection: the document envelope's own bookkeeping
/// fields pass through unfiltered (they carry no secrets), each section is
/// reduced to the whitelist.
pub fn project(doc: &ProvisioningDocument) -> Value {
    let mut envelope = Map::new();
    envelope.insert("status".to_string(), Value::String(doc.status.to_string()));
    if let Some(ts) = &doc.start_timestamp {
        envelope.insert("start-timestamp".to_string(), Value::String(ts.clone()));
    }
    if let Some(ts) = &doc.timestamp {
        envelope.insert("timestamp".to_string(), Value::String(ts.clone()));
    }
    envelope.insert("ignore-result".to_string(), Value::Bool(doc.policy.ignore_result));
    envelope.insert("reboot-on-success".to_string(), Value::Bool(doc.policy.reboot_on_success));
    envelope.insert("reboot-on-failure".to_string(), Value::Bool(doc.policy.reboot_on_failure));
    envelope.insert("halt-on-failure".to_string(), Value::Bool(doc.policy.halt_on_failure));

    for (name, section) in &doc.sections {
        let full = section.to_value();
        let filtered: Map<String, Value> = full
            .as_object()
            .map(|m| m.iter().filter(|(k, _)| SECTION_WHITELIST.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        envelope.insert(name.clone(), Value::Object(filtered));
    }

    let mut top = Map::new();
    top.insert("ztp".to_string(), Value::Object(envelope));
    Value::Object(top)
}
