use sha2::{Digest, Sha256};

use super::DIFFICULTY_PREFIX;

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of the puzzle for a `(proof, previous_proof)` pair: the decimal text
/// of `proof² − previous_proof²`, with a leading `-` when negative.
///
/// Returns `None` when a square does not fit in an `i128`; such a pair can
/// never satisfy the puzzle.
pub fn hash_value(proof: u64, previous_proof: u64) -> Option<String> {
    let proof = i128::from(proof);
    let previous = i128::from(previous_proof);
    let difference = proof
        .checked_mul(proof)?
        .checked_sub(previous.checked_mul(previous)?)?;
    Some(sha256_hex(difference.to_string().as_bytes()))
}

/// Acceptance predicate shared by mining and validation.
pub fn is_valid_proof(proof: u64, previous_proof: u64) -> bool {
    hash_value(proof, previous_proof).is_some_and(|digest| digest.starts_with(DIFFICULTY_PREFIX))
}

/// Brute-force the smallest proof ≥ 1 accepted against `previous_proof`.
/// CPU-bound with no upper bound on iterations; run it off the async executor.
pub fn proof_of_work(previous_proof: u64) -> u64 {
    let mut candidate: u64 = 1;
    while !is_valid_proof(candidate, previous_proof) {
        candidate = candidate.wrapping_add(1);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_proof_after_genesis() {
        assert_eq!(proof_of_work(1), 533);
    }

    #[test]
    fn search_returns_the_smallest_candidate() {
        let proof = proof_of_work(1);
        assert!(is_valid_proof(proof, 1));
        assert!((1..proof).all(|candidate| !is_valid_proof(candidate, 1)));
    }

    #[test]
    fn negative_differences_keep_their_sign() {
        // 21391² − 45293² is negative; the digest is taken over "-1593...".
        assert_eq!(proof_of_work(533), 45293);
        assert_eq!(proof_of_work(45293), 21391);
        assert!(is_valid_proof(21391, 45293));
        assert_eq!(
            hash_value(1, 5).unwrap(),
            sha256_hex(b"-24"),
        );
    }

    #[test]
    fn digest_matches_reference_text() {
        // sha256("-24")
        assert_eq!(
            sha256_hex("-24".as_bytes()),
            "628eee823448ed34c634b578436a53dcbb6559f18b696db721fb25ab0aa1fb4b"
        );
    }

    #[test]
    fn oversized_proofs_never_validate() {
        assert!(hash_value(u64::MAX, 1).is_none());
        assert!(!is_valid_proof(u64::MAX, 1));
    }
}
