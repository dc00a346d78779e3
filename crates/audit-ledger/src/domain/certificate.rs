//! Certificate projection.
//!
//! Deterministically projects the ledger plus an envelope snapshot into the
//! human-readable summary the sealing pipeline appends to the final document.

use super::entities::AuditLogEntry;
use serde::{Deserialize, Serialize};
use shared_types::{EnvelopeId, RecipientId, Timestamp};

/// Snapshot of one signer for the certificate, in signing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSummary {
    /// The recipient's id.
    pub recipient_id: RecipientId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role label ("Signer", "Approver", ...).
    pub role: String,
    /// Signing-order rank, when ordered signing is configured.
    pub order: Option<u32>,
    /// When the recipient signed, if they did.
    pub signed_at: Option<Timestamp>,
}

/// The envelope state the certificate summarizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeSnapshot {
    /// The envelope id.
    pub envelope_id: EnvelopeId,
    /// Document title.
    pub title: String,
    /// SHA-256 of the composed (pre-seal) content, hex.
    pub content_hash: String,
    /// Signers in signing order.
    pub signers: Vec<SignerSummary>,
}

/// The rendered certificate: structured summary plus plain-text rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDocument {
    /// The envelope this certifies.
    pub envelope_id: EnvelopeId,
    /// Pre-seal content hash (hex sha-256).
    pub content_hash: String,
    /// Signer identities in signing order.
    pub signers: Vec<SignerSummary>,
    /// Plain-text rendering appended to the sealed document.
    pub text: String,
}

/// Projects the ledger and snapshot into a certificate.
///
/// Pure function: identical inputs always yield an identical document, so a
/// re-run sealing job produces a byte-identical trailing section.
#[must_use]
pub fn render_certificate(
    snapshot: &EnvelopeSnapshot,
    entries: &[AuditLogEntry],
) -> CertificateDocument {
    let mut text = String::new();
    text.push_str("=== SIGNING CERTIFICATE ===\n");
    text.push_str(&format!("Envelope: {}\n", snapshot.envelope_id));
    text.push_str(&format!("Document: {}\n", snapshot.title));
    text.push_str(&format!("Content SHA-256: {}\n", snapshot.content_hash));

    text.push_str("\n--- Signers (in signing order) ---\n");
    for signer in &snapshot.signers {
        let signed = match signer.signed_at {
            Some(ts) => format!("signed at {ts}"),
            None => "did not sign".to_string(),
        };
        let order = signer
            .order
            .map_or_else(|| "-".to_string(), |o| o.to_string());
        text.push_str(&format!(
            "{}. {} <{}> [{}] {}\n",
            order, signer.name, signer.email, signer.role, signed
        ));
    }

    text.push_str("\n--- Event Trail ---\n");
    for entry in entries {
        text.push_str(&format!(
            "#{} {} by {} at {}\n",
            entry.sequence,
            entry.kind.label(),
            entry.actor,
            entry.timestamp
        ));
    }

    CertificateDocument {
        envelope_id: snapshot.envelope_id,
        content_hash: snapshot.content_hash.clone(),
        signers: snapshot.signers.clone(),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AuditEventKind;
    use shared_types::Actor;

    fn snapshot_with_two_signers() -> EnvelopeSnapshot {
        EnvelopeSnapshot {
            envelope_id: EnvelopeId::new(),
            title: "Master Services Agreement".to_string(),
            content_hash: "ab".repeat(32),
            signers: vec![
                SignerSummary {
                    recipient_id: RecipientId::new(),
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    role: "Signer".to_string(),
                    order: Some(1),
                    signed_at: Some(1_700_000_001_000),
                },
                SignerSummary {
                    recipient_id: RecipientId::new(),
                    name: "Grace Hopper".to_string(),
                    email: "grace@example.com".to_string(),
                    role: "Signer".to_string(),
                    order: Some(2),
                    signed_at: Some(1_700_000_002_000),
                },
            ],
        }
    }

    fn trail(envelope_id: EnvelopeId) -> Vec<AuditLogEntry> {
        vec![
            AuditLogEntry {
                envelope_id,
                sequence: 1,
                kind: AuditEventKind::EnvelopeSent,
                actor: Actor::System,
                timestamp: 1_700_000_000_000,
                metadata: serde_json::Value::Null,
            },
            AuditLogEntry {
                envelope_id,
                sequence: 2,
                kind: AuditEventKind::RecipientSigned,
                actor: Actor::System,
                timestamp: 1_700_000_001_000,
                metadata: serde_json::Value::Null,
            },
        ]
    }

    #[test]
    fn test_render_is_deterministic() {
        let snapshot = snapshot_with_two_signers();
        let entries = trail(snapshot.envelope_id);

        let a = render_certificate(&snapshot, &entries);
        let b = render_certificate(&snapshot, &entries);
        assert_eq!(a, b);
    }

    #[test]
    fn test_certificate_lists_signers_in_order() {
        let snapshot = snapshot_with_two_signers();
        let doc = render_certificate(&snapshot, &trail(snapshot.envelope_id));

        let ada = doc.text.find("Ada Lovelace").unwrap();
        let grace = doc.text.find("Grace Hopper").unwrap();
        assert!(ada < grace);
        assert!(doc.text.contains(&snapshot.content_hash));
    }

    #[test]
    fn test_certificate_includes_event_trail() {
        let snapshot = snapshot_with_two_signers();
        let doc = render_certificate(&snapshot, &trail(snapshot.envelope_id));

        assert!(doc.text.contains("#1 Envelope sent"));
        assert!(doc.text.contains("#2 Recipient signed"));
    }
}
