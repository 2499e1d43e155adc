// SPDX-License-Identifier: MIT

//! Section splitting (spec §4.5 step 8): write each section's own
//! `input.json` slice, without touching an already-existing section
//! directory (preserves a suspended section's state across reruns).

use std::collections::BTreeMap;
use std::io;

use serde_json::{Map, Value};
use tracing::debug;
use ztp_core::Paths;

use crate::section::Section;

pub async fn split_sections(paths: &Paths, sections: &BTreeMap<String, Section>) -> io::Result<()> {
    for (name, section) in sections {
        let dir = paths.section_dir(name);
        if tokio::fs::metadata(&dir).await.is_ok() {
            debug!(section = name, "section directory already exists, leaving its input.json untouched");
            continue;
        }
        tokio::fs::create_dir_all(&dir).await?;

        let mut wrapper = Map::new();
        wrapper.insert(name.clone(), section.to_value());
        let bytes = serde_json::to_vec_pretty(&Value::Object(wrapper))?;
        tokio::fs::write(paths.section_input_path(name), bytes).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztp_config::ConfigStore;

    #[tokio::test]
    async fn splits_each_section_into_its_own_input_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        let cfg = ConfigStore::empty();

        let mut sections = BTreeMap::new();
        sections.insert(
            "0001-firmware".to_string(),
            Section::from_value("0001-firmware", &serde_json::json!({"plugin": "firmware"}), Default::default(), &cfg)
                .expect("parse"),
        );

        split_sections(&paths, &sections).await.expect("split");

        let content = tokio::fs::read_to_string(paths.section_input_path("0001-firmware")).await.expect("read");
        let parsed: Value = serde_json::from_str(&content).expect("parse");
        assert!(parsed.get("0001-firmware").is_some());
    }

    #[tokio::test]
    async fn existing_section_directory_is_left_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        let cfg = ConfigStore::empty();

        let section_dir = paths.section_dir("0001-firmware");
        tokio::fs::create_dir_all(&section_dir).await.expect("mkdir");
        let sentinel = paths.section_input_path("0001-firmware");
        tokio::fs::write(&sentinel, "sentinel").await.expect("write");

        let mut sections = BTreeMap::new();
        sections.insert(
            "0001-firmware".to_string(),
            Section::from_value("0001-firmware", &serde_json::json!({}), Default::default(), &cfg).expect("parse"),
        );
        split_sections(&paths, &sections).await.expect("split");

        let content = tokio::fs::read_to_string(&sentinel).await.expect("read");
        assert_eq!(content, "sentinel");
    }
}
