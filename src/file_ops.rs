use crate::error::HashError;
use crate::hashers::{HashRegistry, StreamHasher};
use crate::models::{Algorithm, DigestResult};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bytes read per block while scanning a file.
pub const BLOCK_SIZE: usize = 4096;

/// Largest block buffer a scan will allocate.
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Shared flag asking a scan to stop at the next block boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Streams files through a registered hash algorithm.
///
/// Stateless between calls; cloning is cheap and each call owns its own
/// file handle and hash state.
#[derive(Debug, Clone)]
pub struct DigestEngine {
    registry: Arc<HashRegistry>,
    block_size: usize,
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestEngine {
    pub fn new() -> Self {
        Self::with_registry(HashRegistry::default())
    }

    pub fn with_registry(registry: HashRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            block_size: BLOCK_SIZE,
        }
    }

    /// Zero falls back to [`BLOCK_SIZE`]; larger values are capped at
    /// [`MAX_BLOCK_SIZE`].
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = match block_size {
            0 => BLOCK_SIZE,
            n => n.min(MAX_BLOCK_SIZE),
        };
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn registry(&self) -> &HashRegistry {
        &self.registry
    }

    /// Compute the digest of the file at `path`.
    pub fn compute(&self, path: &Path, algorithm: Algorithm) -> Result<DigestResult, HashError> {
        self.scan(path, algorithm, None)
    }

    /// Like [`compute`](Self::compute), checking `cancel` before every block read.
    pub fn compute_cancellable(
        &self,
        path: &Path,
        algorithm: Algorithm,
        cancel: &CancelToken,
    ) -> Result<DigestResult, HashError> {
        self.scan(path, algorithm, Some(cancel))
    }

    /// Hash any reader in blocks and return the hex digest.
    pub fn compute_reader<R: Read>(&self, reader: R, algorithm: Algorithm) -> io::Result<String> {
        let mut hasher = self
            .registry
            .hasher(algorithm)
            .map_err(|e| io::Error::new(io::ErrorKind::Unsupported, e))?;
        self.feed(reader, hasher.as_mut(), None)?;
        Ok(hasher.finalize_hex())
    }

    /// Hash an in-memory buffer with a single update.
    pub fn digest_bytes(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError> {
        let mut hasher = self.registry.hasher(algorithm)?;
        hasher.update(data);
        Ok(hasher.finalize_hex())
    }

    fn scan(
        &self,
        path: &Path,
        algorithm: Algorithm,
        cancel: Option<&CancelToken>,
    ) -> Result<DigestResult, HashError> {
        // resolve first so a config mismatch never touches the file system
        let mut hasher = self.registry.hasher(algorithm)?;
        if cancelled(cancel) {
            return Err(HashError::Cancelled {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| HashError::from_open(path, e))?;
        let meta = file
            .metadata()
            .map_err(|e| HashError::unreadable(path, e))?;
        if meta.is_dir() {
            return Err(HashError::unreadable(
                path,
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            ));
        }

        let total = match self.feed(file, hasher.as_mut(), cancel) {
            Ok(total) => total,
            Err(e) if e.kind() == io::ErrorKind::Interrupted && cancelled(cancel) => {
                tracing::info!(path = %path.display(), %algorithm, "hash cancelled");
                return Err(HashError::Cancelled {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(HashError::read(path, e)),
        };

        let hex = hasher.finalize_hex();
        tracing::debug!(path = %path.display(), %algorithm, bytes = total, "hash computed");
        Ok(DigestResult::new(algorithm, hex, path.to_path_buf()))
    }

    /// Sequential block loop shared by every entry point. A cancellation
    /// surfaces as `ErrorKind::Interrupted`.
    fn feed<R: Read>(
        &self,
        mut reader: R,
        hasher: &mut dyn StreamHasher,
        cancel: Option<&CancelToken>,
    ) -> io::Result<u64> {
        let mut buf = vec![0u8; self.block_size];
        let mut total = 0u64;
        loop {
            if cancelled(cancel) {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
            total += n as u64;
        }
        Ok(total)
    }
}

fn cancelled(cancel: Option<&CancelToken>) -> bool {
    cancel.is_some_and(CancelToken::is_cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use sha2::{Digest, Sha256};
    use std::io::{Cursor, Write};

    fn file_with(data: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(data).unwrap();
        f.flush().unwrap();
        f
    }

    fn hex_of(algorithm: Algorithm, data: &[u8]) -> String {
        let f = file_with(data);
        DigestEngine::new()
            .compute(f.path(), algorithm)
            .unwrap()
            .hex_digest()
            .to_string()
    }

    const ABC_GOLDEN: &[(Algorithm, &str)] = &[
        (Algorithm::Blake2b, "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d17d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"),
        (Algorithm::Blake2s, "508c5e8c327c14e2e1a72ba34eeb452f37458b209ed63a294d999b4c86675982"),
        (Algorithm::Md5, "900150983cd24fb0d6963f7d28e17f72"),
        (Algorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"),
        (Algorithm::Sha224, "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"),
        (Algorithm::Sha256, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
        (Algorithm::Sha384, "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7"),
        (Algorithm::Sha512, "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"),
        (Algorithm::Sha3_224, "e642824c3f8cf24ad09234ee7d3c766fc9a3a5168d0c94ad73b46fdf"),
        (Algorithm::Sha3_256, "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"),
        (Algorithm::Sha3_384, "ec01498288516fc926459f58e2c6ad8df9b473cb0fc08c2596da7cf0e49be4b298d88cea927ac7f539f1edf228376d25"),
        (Algorithm::Sha3_512, "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eec53f0"),
        (Algorithm::Shake128, "5881092dd818bf5cf8a3ddb793fbcba74097d5c526a6d35f97b83351940f2cc8"),
        (Algorithm::Shake256, "483366601360a8771c6863080cc4114d8db44530f8f1e1ee4f94ea37e78b5739d5a15bef186a5386c75744c0527e1faa9f8726e462a12a4feb06bd8801e751e4"),
    ];

    const EMPTY_GOLDEN: &[(Algorithm, &str)] = &[
        (Algorithm::Blake2b, "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"),
        (Algorithm::Blake2s, "69217a3079908094e11121d042354a7c1f55b6482ca1a51e1b250dfd1ed0eef9"),
        (Algorithm::Md5, "d41d8cd98f00b204e9800998ecf8427e"),
        (Algorithm::Sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
        (Algorithm::Sha224, "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f"),
        (Algorithm::Sha256, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        (Algorithm::Sha384, "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b"),
        (Algorithm::Sha512, "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"),
        (Algorithm::Sha3_224, "6b4e03423667dbb73b6e15454f0eb1abd4597f9a1b078e3f5b5a6bc7"),
        (Algorithm::Sha3_256, "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"),
        (Algorithm::Sha3_384, "0c63a75b845e4f7d01107d852e4c2485c51a50aaaa94fc61995e71bbee983a2ac3713831264adb47fb6bd1e058d5f004"),
        (Algorithm::Sha3_512, "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26"),
        (Algorithm::Shake128, "7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26"),
        (Algorithm::Shake256, "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762fd75dc4ddd8c0f200cb05019d67b592f6fc821c49479ab48640292eacb3b7c4be"),
    ];

    #[test]
    fn golden_values_for_abc() {
        for (algo, expected) in ABC_GOLDEN {
            assert_eq!(hex_of(*algo, b"abc"), *expected, "{algo}");
        }
    }

    #[test]
    fn empty_file_gives_zero_byte_digest() {
        for (algo, expected) in EMPTY_GOLDEN {
            assert_eq!(hex_of(*algo, b""), *expected, "{algo}");
        }
    }

    #[test]
    fn golden_tables_cover_supported_set() {
        assert_eq!(ABC_GOLDEN.len(), Algorithm::SUPPORTED.len());
        assert_eq!(EMPTY_GOLDEN.len(), Algorithm::SUPPORTED.len());
    }

    #[test]
    fn result_carries_algorithm_and_path() {
        let f = file_with(b"hello\n");
        let res = DigestEngine::new().compute(f.path(), Algorithm::Sha256).unwrap();
        assert_eq!(res.algorithm(), Algorithm::Sha256);
        assert_eq!(res.source_path(), f.path());
        assert_eq!(
            res.hex_digest(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn compute_is_idempotent() {
        let f = file_with(&[7u8; 10_000]);
        let engine = DigestEngine::new();
        let a = engine.compute(f.path(), Algorithm::Sha3_256).unwrap();
        let b = engine.compute(f.path(), Algorithm::Sha3_256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn block_boundaries_match_whole_buffer() {
        let engine = DigestEngine::new();
        for size in [1, 4095, 4096, 4097, 2 * 4096, 3 * 4096, 3 * 4096 + 1, 5 * 4096 - 1] {
            let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let streamed = hex_of(Algorithm::Sha256, &data);
            assert_eq!(streamed, hex::encode(Sha256::digest(&data)), "size {size}");
            for algo in Algorithm::SUPPORTED {
                assert_eq!(
                    hex_of(*algo, &data),
                    engine.digest_bytes(*algo, &data).unwrap(),
                    "{algo} size {size}"
                );
            }
        }
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DigestEngine::new()
            .compute(&dir.path().join("absent.bin"), Algorithm::Md5)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn path_below_regular_file_is_file_not_found() {
        let f = file_with(b"abc");
        let target = f.path().join("child.bin");
        let err = DigestEngine::new()
            .compute(&target, Algorithm::Md5)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.path(), Some(target.as_path()));
    }

    #[test]
    fn directory_is_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = DigestEngine::new()
            .compute(dir.path(), Algorithm::Md5)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileUnreadable);
        assert_eq!(err.path(), Some(dir.path()));
    }

    #[test]
    fn pbkdf2_fails_before_opening_file() {
        let err = DigestEngine::new()
            .compute(Path::new("/definitely/not/here"), Algorithm::Pbkdf2Hmac)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn cancelled_token_stops_scan() {
        let f = file_with(&[1u8; 3 * 4096]);
        let token = CancelToken::new();
        token.cancel();
        let err = DigestEngine::new()
            .compute_cancellable(f.path(), Algorithm::Sha1, &token)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn zero_block_size_falls_back() {
        assert_eq!(DigestEngine::new().with_block_size(0).block_size(), BLOCK_SIZE);
    }

    #[test]
    fn oversized_block_size_is_capped() {
        let engine = DigestEngine::new().with_block_size(usize::MAX / 2);
        assert_eq!(engine.block_size(), MAX_BLOCK_SIZE);
        let f = file_with(b"abc");
        let res = engine.compute(f.path(), Algorithm::Md5).unwrap();
        assert_eq!(res.hex_digest(), "900150983cd24fb0d6963f7d28e17f72");
    }

    struct FailAfter {
        remaining: usize,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(0);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn mid_read_error_is_fatal() {
        let err = DigestEngine::new()
            .compute_reader(FailAfter { remaining: 5000 }, Algorithm::Sha256)
            .unwrap_err();
        assert_eq!(err.to_string(), "device gone");
    }

    proptest! {
        #[test]
        fn any_block_size_gives_same_digest(
            data in proptest::collection::vec(any::<u8>(), 0..20_000),
            block in 1usize..9000,
        ) {
            let engine = DigestEngine::new().with_block_size(block);
            let streamed = engine.compute_reader(Cursor::new(&data), Algorithm::Blake2s).unwrap();
            prop_assert_eq!(streamed, engine.digest_bytes(Algorithm::Blake2s, &data).unwrap());
        }
    }
}
