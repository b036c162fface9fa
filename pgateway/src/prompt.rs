//! System prompt loading.

use std::path::Path;

/// Reads the system prompt once at startup. An unreadable file is logged
/// and the process continues with an empty prompt; the system slot in the
/// outgoing window stays present either way so the upstream request shape
/// is stable.
pub fn load_system_prompt(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => text.trim().to_string(),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "system prompt unreadable, continuing with an empty prompt"
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_and_trims_the_prompt_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "  You are a helpful assistant.  ").expect("write");

        let prompt = load_system_prompt(file.path());
        assert_eq!(prompt, "You are a helpful assistant.");
    }

    #[test]
    fn missing_file_yields_empty_prompt() {
        let prompt = load_system_prompt("/definitely/not/a/real/prompt.txt");
        assert!(prompt.is_empty());
    }
}
