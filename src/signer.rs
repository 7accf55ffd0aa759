//! Request signing.
//!
//! The signature is the hex MD5 of the shared secret followed by every
//! `key` + `value` pair, keys in byte order, with no separators. MD5 is what
//! the remote side verifies, so it cannot be swapped for a stronger digest.

use std::collections::BTreeMap;

use md5::{Digest, Md5};

/// Argument name the signature is sent under. A caller-supplied value under
/// this name is discarded and recomputed whenever the request is signed.
pub const SIGNATURE_KEY: &str = "api_sig";

/// Sign an argument map with the shared secret
pub fn sign<I, K, V>(args: I, secret: &str) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = args.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_ref().as_bytes().cmp(b.0.as_ref().as_bytes()));

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (key, value) in &pairs {
        hasher.update(key.as_ref().as_bytes());
        hasher.update(value.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Compute the signature over `args` and add it under [`SIGNATURE_KEY`],
/// replacing any value already there
pub fn sign_in_place(args: &mut BTreeMap<String, String>, secret: &str) {
    args.remove(SIGNATURE_KEY);
    let signature = sign(args.iter(), secret);
    args.insert(SIGNATURE_KEY.to_string(), signature);
}
