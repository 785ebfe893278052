use std::path::Path;

use tokio::fs;

/// File name of the topology document inside a model directory.
pub const TOPOLOGY_FILE: &str = "model.json";

const SHARD_PREFIX: &str = "group1-shard";
const SHARD_SUFFIX: &str = ".bin";

/// Name of the `index`-th weight shard out of `total`.
pub fn shard_file_name(index: usize, total: usize) -> String {
    format!("{SHARD_PREFIX}{index}of{total}{SHARD_SUFFIX}")
}

/// Reports whether `dir` holds a complete-looking model: the topology file
/// plus at least one weight shard.
///
/// Total and side-effect-free: every filesystem error (missing directory,
/// permissions, not a directory) maps to `false`.
pub async fn is_model_present(dir: &Path) -> bool {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    let mut has_topology = false;
    let mut has_shard = false;

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };

                if name == TOPOLOGY_FILE {
                    has_topology = true;
                } else if name.starts_with(SHARD_PREFIX) && name.ends_with(SHARD_SUFFIX) {
                    has_shard = true;
                }
            }
            Ok(None) => break,
            Err(_) => return false,
        }
    }

    has_topology && has_shard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_not_present() {
        assert!(!is_model_present(Path::new("/definitely/not/here")).await);
    }

    #[tokio::test]
    async fn topology_alone_is_not_enough() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOPOLOGY_FILE), b"{}").unwrap();

        assert!(!is_model_present(dir.path()).await);
    }

    #[tokio::test]
    async fn shard_alone_is_not_enough() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(shard_file_name(1, 4)), b"\0\0\0\0").unwrap();

        assert!(!is_model_present(dir.path()).await);
    }

    #[tokio::test]
    async fn topology_plus_one_shard_is_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOPOLOGY_FILE), b"{}").unwrap();
        std::fs::write(dir.path().join(shard_file_name(2, 4)), b"\0\0\0\0").unwrap();

        assert!(is_model_present(dir.path()).await);
    }

    #[test]
    fn shard_names_follow_the_fixed_pattern() {
        assert_eq!(shard_file_name(3, 37), "group1-shard3of37.bin");
    }
}
