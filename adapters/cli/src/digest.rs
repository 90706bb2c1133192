use std::fmt::Write as _;

use anyhow::{Context, Result};
use outpost_world::snapshot::Snapshot;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the snapshot's JSON form.
pub(crate) fn snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let json = serde_json::to_vec(snapshot).context("failed to serialise snapshot")?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_world::{config::GameConfig, generation::generate};

    #[test]
    fn digest_follows_state() {
        let mut game = generate(&GameConfig::default()).expect("valid config");
        let before = snapshot_digest(&game.snapshot()).expect("digest");

        assert_eq!(before.len(), 64);
        assert_eq!(before, snapshot_digest(&game.snapshot()).expect("digest"));

        let _ = game.execute_turn(&[]).expect("game is running");
        assert_ne!(before, snapshot_digest(&game.snapshot()).expect("digest"));
    }
}
