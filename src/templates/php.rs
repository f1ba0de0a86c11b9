use std::collections::{BTreeMap, BTreeSet};

// Key of a `key = value` ini line and whether it is active (not commented out)
fn ini_entry(line: &str) -> Option<(&str, bool)> {
    let trimmed = line.trim_start();
    let active = !trimmed.starts_with(';');
    let body = trimmed.trim_start_matches(';').trim_start();
    let (key, _) = body.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) || key.starts_with('[') {
        return None;
    }
    Some((key, active))
}

/// Sets each key to `key = value`. PHP honours the last active definition, so every
/// active line for a key is rewritten; a commented-out line is uncommented only when
/// the key has no active line, and keys that never appear are appended.
pub fn apply_ini_settings(text: &str, settings: &BTreeMap<String, String>) -> String {
    let active: BTreeSet<&str> = text
        .lines()
        .filter_map(ini_entry)
        .filter(|(key, is_active)| *is_active && settings.contains_key(*key))
        .map(|(key, _)| key)
        .collect();
    let mut pending: BTreeMap<&str, &str> = settings
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let mut out: Vec<String> = text
        .lines()
        .map(|line| match ini_entry(line) {
            Some((key, true)) if active.contains(key) => {
                pending.remove(key);
                format!("{} = {}", key, settings[key])
            }
            Some((key, false)) if !active.contains(key) => match pending.remove(key) {
                Some(value) => format!("{} = {}", key, value),
                None => line.to_string(),
            },
            _ => line.to_string(),
        })
        .collect();

    for (key, value) in pending {
        out.push(format!("{} = {}", key, value));
    }

    let mut rendered = out.join("\n");
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn uncomments_and_replaces_existing_keys() {
        let ini = "[PHP]\nmemory_limit = 128M\n; max_input_vars = 1000\nupload_max_filesize = 2M\n";
        let out = apply_ini_settings(
            ini,
            &table(&[("max_input_vars", "5000"), ("memory_limit", "256M")]),
        );
        assert_eq!(
            out,
            "[PHP]\nmemory_limit = 256M\nmax_input_vars = 5000\nupload_max_filesize = 2M\n"
        );
    }

    #[test]
    fn active_definition_wins_over_commented_example() {
        let ini = "; memory_limit = 64M\n[PHP]\nmemory_limit = 128M\n";
        let out = apply_ini_settings(ini, &table(&[("memory_limit", "256M")]));
        assert_eq!(out, "; memory_limit = 64M\n[PHP]\nmemory_limit = 256M\n");
    }

    #[test]
    fn every_active_definition_is_rewritten() {
        let ini = "memory_limit = 128M\n;memory_limit = 64M\nmemory_limit = 512M\n";
        let out = apply_ini_settings(ini, &table(&[("memory_limit", "256M")]));
        assert_eq!(out, "memory_limit = 256M\n;memory_limit = 64M\nmemory_limit = 256M\n");
    }

    #[test]
    fn only_first_commented_line_is_uncommented() {
        let ini = ";max_input_vars = 1000\n;max_input_vars = 2000\n";
        let out = apply_ini_settings(ini, &table(&[("max_input_vars", "5000")]));
        assert_eq!(out, "max_input_vars = 5000\n;max_input_vars = 2000\n");
    }

    #[test]
    fn missing_keys_are_appended_and_comments_left_alone() {
        let ini = "; This is a comment about memory\n[PHP]\n";
        let out = apply_ini_settings(ini, &table(&[("post_max_size", "100M")]));
        assert_eq!(out, "; This is a comment about memory\n[PHP]\npost_max_size = 100M\n");
    }

    #[test]
    fn similar_prefixes_do_not_match() {
        let ini = "max_input_vars_extra = 1\n";
        let out = apply_ini_settings(ini, &table(&[("max_input_vars", "5000")]));
        assert_eq!(out, "max_input_vars_extra = 1\nmax_input_vars = 5000\n");
    }
}
