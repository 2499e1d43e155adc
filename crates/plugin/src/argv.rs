// SPDX-License-Identifier: MIT

//! Plugin invocation argv construction (spec §6 "Plugin invocation
//! contract"). The literal `args` string is tokenized shell-words style
//! (spec §11 supplemented feature), the way the source implementation's
//! `shlex.split` tokenizes its own concatenated command line.

use std::path::Path;

/// `argv = [plugin-path, <section-input-json-path>?, <args-tokens>...]`.
pub fn build(plugin_path: &Path, input_json_path: Option<&Path>, args: Option<&str>) -> Vec<String> {
    let mut argv = vec![plugin_path.to_string_lossy().to_string()];
    if let Some(input) = input_json_path {
        argv.push(input.to_string_lossy().to_string());
    }
    if let Some(args) = args {
        match shell_words::split(args) {
            Ok(tokens) => argv.extend(tokens),
            Err(_) => {
                tracing::warn!(args, "plugin args could not be tokenized, passing through verbatim");
                argv.push(args.to_string());
            }
        }
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builds_argv_with_input_path_and_tokenized_args() {
        let argv = build(&PathBuf::from("/plugins/firmware"), Some(&PathBuf::from("/sections/0001/input.json")), Some("--force --retry 3"));
        assert_eq!(
            argv,
            vec!["/plugins/firmware", "/sections/0001/input.json", "--force", "--retry", "3"]
        );
    }

    #[test]
    fn omits_input_path_when_ignore_section_data() {
        let argv = build(&PathBuf::from("/plugins/firmware"), None, None);
        assert_eq!(argv, vec!["/plugins/firmware"]);
    }

    #[test]
    fn tokenizes_quoted_args() {
        let argv = build(&PathBuf::from("/plugins/firmware"), None, Some("--name \"a b\""));
        assert_eq!(argv, vec!["/plugins/firmware", "--name", "a b"]);
    }
}
