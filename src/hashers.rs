use crate::error::HashError;
use crate::models::Algorithm;
use sha2::digest::Digest;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use std::collections::HashMap;
use std::fmt;

/// Incremental hash state: fed blocks in order, finalized once.
pub trait StreamHasher: Send {
    fn update(&mut self, data: &[u8]);

    /// Consume the state and render the digest as lowercase hex.
    fn finalize_hex(self: Box<Self>) -> String;
}

/// Builds a fresh hash state for one computation.
pub type HasherFactory = fn() -> Box<dyn StreamHasher>;

/// Any fixed-output `Digest` implementation.
pub struct FixedDigest<D>(D);

impl<D: Digest + Send> FixedDigest<D> {
    pub fn boxed() -> Box<dyn StreamHasher>
    where
        D: 'static,
    {
        Box::new(FixedDigest(D::new()))
    }
}

impl<D: Digest + Send> StreamHasher for FixedDigest<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        hex::encode(self.0.finalize())
    }
}

/// Extendable-output function read out to a fixed length.
pub struct Xof<H> {
    state: H,
    output_len: usize,
}

impl<H: Default + Update + ExtendableOutput + Send + 'static> Xof<H> {
    pub fn boxed(output_len: usize) -> Box<dyn StreamHasher> {
        Box::new(Xof {
            state: H::default(),
            output_len,
        })
    }
}

impl<H: Update + ExtendableOutput + Send> StreamHasher for Xof<H> {
    fn update(&mut self, data: &[u8]) {
        Update::update(&mut self.state, data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        let mut out = vec![0u8; self.output_len];
        self.state.finalize_xof().read(&mut out);
        hex::encode(out)
    }
}

/// MD5 through the `md5` crate's streaming context.
pub struct Md5Context(md5::Context);

impl StreamHasher for Md5Context {
    fn update(&mut self, data: &[u8]) {
        self.0.consume(data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        format!("{:x}", self.0.finalize())
    }
}

fn md5() -> Box<dyn StreamHasher> {
    Box::new(Md5Context(md5::Context::new()))
}

fn shake_128() -> Box<dyn StreamHasher> {
    Xof::<sha3::Shake128>::boxed(32)
}

fn shake_256() -> Box<dyn StreamHasher> {
    Xof::<sha3::Shake256>::boxed(64)
}

/// Maps algorithm ids to hash state factories.
#[derive(Clone)]
pub struct HashRegistry {
    factories: HashMap<Algorithm, HasherFactory>,
}

impl HashRegistry {
    /// A registry with nothing mapped.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Plug in (or replace) the factory for `algorithm`.
    pub fn register(&mut self, algorithm: Algorithm, factory: HasherFactory) -> &mut Self {
        self.factories.insert(algorithm, factory);
        self
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.factories.contains_key(&algorithm)
    }

    pub fn hasher(&self, algorithm: Algorithm) -> Result<Box<dyn StreamHasher>, HashError> {
        self.factories
            .get(&algorithm)
            .map(|factory| factory())
            .ok_or_else(|| HashError::UnsupportedAlgorithm {
                algorithm: algorithm.name().to_string(),
            })
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        let mut registry = HashRegistry::empty();
        registry
            .register(Algorithm::Blake2b, FixedDigest::<blake2::Blake2b512>::boxed)
            .register(Algorithm::Blake2s, FixedDigest::<blake2::Blake2s256>::boxed)
            .register(Algorithm::Md5, md5)
            .register(Algorithm::Sha1, FixedDigest::<sha1::Sha1>::boxed)
            .register(Algorithm::Sha224, FixedDigest::<sha2::Sha224>::boxed)
            .register(Algorithm::Sha256, FixedDigest::<sha2::Sha256>::boxed)
            .register(Algorithm::Sha384, FixedDigest::<sha2::Sha384>::boxed)
            .register(Algorithm::Sha512, FixedDigest::<sha2::Sha512>::boxed)
            .register(Algorithm::Sha3_224, FixedDigest::<sha3::Sha3_224>::boxed)
            .register(Algorithm::Sha3_256, FixedDigest::<sha3::Sha3_256>::boxed)
            .register(Algorithm::Sha3_384, FixedDigest::<sha3::Sha3_384>::boxed)
            .register(Algorithm::Sha3_512, FixedDigest::<sha3::Sha3_512>::boxed)
            .register(Algorithm::Shake128, shake_128)
            .register(Algorithm::Shake256, shake_256);
        registry
    }
}

impl fmt::Debug for HashRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(|a| a.name()).collect();
        names.sort_unstable();
        f.debug_struct("HashRegistry").field("algorithms", &names).finish()
    }
}
