use crypto_box::{aead::Aead, Nonce, SalsaBox, SecretKey};
use rand::{CryptoRng, RngCore};

use crate::{
    constants::{KEY_LENGTH, NONCE_LENGTH, TAG_LENGTH},
    EncryptionKey, Error, Result, SpendingKey,
};

/// An x25519-xsalsa20-poly1305 ciphertext addressed to one encryption key
///
/// Each envelope uses a fresh ephemeral keypair and a random nonce. On the ledger it is stored
/// as `nonce (24) ‖ ephemeral_key (32) ‖ ciphertext`, usually hex encoded with a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_LENGTH],
    ephemeral_key: [u8; KEY_LENGTH],
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` to `recipient`
    pub fn seal(
        recipient: &EncryptionKey,
        plaintext: &[u8],
        mut rng: impl RngCore + CryptoRng,
    ) -> Result<Self> {
        let mut secret = [0; KEY_LENGTH];
        rng.fill_bytes(&mut secret);
        let ephemeral = SecretKey::from(secret);

        let mut nonce = [0; NONCE_LENGTH];
        rng.fill_bytes(&mut nonce);

        let ciphertext = SalsaBox::new(&recipient.to_box_key(), &ephemeral)
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| Error::Encryption)?;

        Ok(Self {
            nonce,
            ephemeral_key: ephemeral.public_key().to_bytes(),
            ciphertext,
        })
    }

    /// Decrypt with the secret behind the recipient's encryption key
    ///
    /// Fails with [`Error::Decryption`] if the envelope was addressed to someone else or was
    /// modified.
    pub fn open(&self, key: &SpendingKey) -> Result<Vec<u8>> {
        let ephemeral = EncryptionKey::from_bytes(self.ephemeral_key).to_box_key();

        SalsaBox::new(&ephemeral, &key.box_secret())
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map_err(|_| Error::Decryption)
    }

    /// The packed encoding
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NONCE_LENGTH + KEY_LENGTH + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ephemeral_key);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Split a packed envelope into its parts
    ///
    /// Only the structure is checked here; authenticity is checked by [`open`](Self::open).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_LENGTH + KEY_LENGTH + TAG_LENGTH {
            return Err(Error::EnvelopeLength(bytes.len()));
        }

        let (nonce, rest) = bytes.split_at(NONCE_LENGTH);
        let (ephemeral_key, ciphertext) = rest.split_at(KEY_LENGTH);

        let mut envelope = Self {
            nonce: [0; NONCE_LENGTH],
            ephemeral_key: [0; KEY_LENGTH],
            ciphertext: ciphertext.to_vec(),
        };
        envelope.nonce.copy_from_slice(nonce);
        envelope.ephemeral_key.copy_from_slice(ephemeral_key);

        Ok(envelope)
    }

    /// `0x`-prefixed hex of the packed encoding
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Parse packed hex, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_bytes(&bytes)
    }

    /// The 24-byte nonce
    #[must_use]
    pub fn nonce(&self) -> &[u8; NONCE_LENGTH] {
        &self.nonce
    }

    /// The sender's ephemeral public key
    #[must_use]
    pub fn ephemeral_key(&self) -> &[u8; KEY_LENGTH] {
        &self.ephemeral_key
    }

    /// The ciphertext, including its authentication tag
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;
    use crate::{constants::ENVELOPE_LENGTH, Amounts, NotePayload};

    fn rng() -> ChaChaRng {
        ChaChaRng::from_seed([7; 32])
    }

    #[test]
    fn sealed_envelopes_open_for_the_recipient_only() {
        let mut rng = rng();
        let alice = SpendingKey::random(&mut rng);
        let eve = SpendingKey::random(&mut rng);

        let envelope = Envelope::seal(&alice.encryption_key(), b"hello", &mut rng).unwrap();

        assert_eq!(envelope.open(&alice).unwrap(), b"hello");
        assert_eq!(envelope.open(&eve), Err(Error::Decryption));
    }

    #[test]
    fn note_envelopes_have_a_fixed_length() {
        let mut rng = rng();
        let key = SpendingKey::random(&mut rng);
        let payload = NotePayload {
            blinding: zk_primitives::Element::new(1),
            amounts: Amounts::ZERO,
        };

        let envelope = Envelope::seal(&key.encryption_key(), &payload.to_bytes(), &mut rng).unwrap();

        assert_eq!(envelope.to_bytes().len(), ENVELOPE_LENGTH);
    }

    #[test]
    fn hex_round_trip_accepts_optional_prefix() {
        let mut rng = rng();
        let key = SpendingKey::random(&mut rng);
        let envelope = Envelope::seal(&key.encryption_key(), &[1, 2, 3], &mut rng).unwrap();

        let hex = envelope.to_hex();
        assert!(hex.starts_with("0x"));

        assert_eq!(Envelope::from_hex(&hex).unwrap(), envelope);
        assert_eq!(Envelope::from_hex(&hex[2..]).unwrap(), envelope);
    }

    #[test]
    fn tampering_is_detected() {
        let mut rng = rng();
        let key = SpendingKey::random(&mut rng);
        let envelope = Envelope::seal(&key.encryption_key(), &[0; 64], &mut rng).unwrap();

        let mut bytes = envelope.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;

        let tampered = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(tampered.open(&key), Err(Error::Decryption));
    }

    #[test]
    fn short_envelopes_are_rejected() {
        assert_eq!(
            Envelope::from_bytes(&[0; 71]),
            Err(Error::EnvelopeLength(71))
        );
        assert!(Envelope::from_bytes(&[0; 72]).is_ok());
    }

    #[test]
    fn random_bytes_do_not_open() {
        let mut rng = rng();
        let key = SpendingKey::random(&mut rng);

        let mut bytes = vec![0; ENVELOPE_LENGTH];
        rng.fill_bytes(&mut bytes);

        let envelope = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(envelope.open(&key), Err(Error::Decryption));
    }
}
