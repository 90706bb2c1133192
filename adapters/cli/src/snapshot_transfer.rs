use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use outpost_world::snapshot::Snapshot;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "outpost";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "outpost:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a game snapshot into a single line suitable for copying between
/// an authoritative process and a replica.
pub(crate) fn encode(snapshot: &Snapshot) -> Result<String, SnapshotTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(SnapshotTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
        snapshot.width, snapshot.height
    ))
}

/// Decodes a snapshot from its transfer string.
pub(crate) fn decode(value: &str) -> Result<Snapshot, SnapshotTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SnapshotTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SnapshotTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SnapshotTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(SnapshotTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(SnapshotTransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(SnapshotTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(SnapshotTransferError::InvalidPayload)?;

    if (snapshot.width, snapshot.height) != (width, height) {
        return Err(SnapshotTransferError::DimensionMismatch {
            declared: dimensions.to_owned(),
            width: snapshot.width,
            height: snapshot.height,
        });
    }

    Ok(snapshot)
}

/// Errors that can occur while encoding or decoding transfer strings.
#[derive(Debug, Error)]
pub(crate) enum SnapshotTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The board dimensions were missing.
    #[error("snapshot string is missing the board dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unknown revision.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed.
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    /// The header disagrees with the board stored in the payload.
    #[error("header declares a {declared} board but the payload holds {width}x{height}")]
    DimensionMismatch {
        /// Dimensions written in the header.
        declared: String,
        /// Width stored in the payload.
        width: u32,
        /// Height stored in the payload.
        height: u32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload is not a valid snapshot document.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SnapshotTransferError> {
    let invalid = || SnapshotTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_world::{config::GameConfig, generation::generate};

    fn snapshot() -> Snapshot {
        let config = GameConfig {
            width: 12,
            height: 9,
            ..GameConfig::default()
        };
        generate(&config).expect("valid config").snapshot()
    }

    #[test]
    fn round_trip_generated_board() {
        let snapshot = snapshot();

        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:12x9:")));

        let decoded = decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let snapshot = snapshot();
        let encoded = encode(&snapshot).expect("snapshot encodes");

        let decoded = decode(&format!("  {encoded}\n")).expect("snapshot decodes");

        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(decode("   "), Err(SnapshotTransferError::EmptyPayload)));
        assert!(matches!(
            decode("maze:v1:12x9:abc"),
            Err(SnapshotTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("outpost:v2:12x9:abc"),
            Err(SnapshotTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("outpost:v1:12by9:abc"),
            Err(SnapshotTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("outpost:v1:0x9:abc"),
            Err(SnapshotTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("outpost:v1:12x9"),
            Err(SnapshotTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("outpost:v1:12x9:!!!"),
            Err(SnapshotTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn header_must_match_payload() {
        let encoded = encode(&snapshot()).expect("snapshot encodes");
        let forged = encoded.replacen(":12x9:", ":20x20:", 1);

        assert!(matches!(
            decode(&forged),
            Err(SnapshotTransferError::DimensionMismatch {
                width: 12,
                height: 9,
                ..
            })
        ));
    }
}
