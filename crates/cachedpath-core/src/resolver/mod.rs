//! Resolution pipeline: identifier → local file, cached download, or extracted entry.

mod extract;
mod remote;

use crate::cache::CacheStore;
use crate::error::{CachedPathError, Result};
use crate::identifier::{self, Identifier};
use crate::options::ResolveOptions;
use crate::transport::{HttpTransport, Transport, TransportRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves identifiers with a fixed set of options and transports.
///
/// Cheap to share across threads; concurrent callers of the same remote identifier
/// are serialized by the cache entry's file lock.
#[derive(Debug, Clone)]
pub struct Resolver {
    options: ResolveOptions,
    registry: TransportRegistry,
}

impl Resolver {
    /// Resolver with the built-in HTTP(S) transport configured from `options`.
    pub fn new(options: ResolveOptions) -> Self {
        let http = HttpTransport::new(options.http_client_config(), options.retry_policy());
        let registry = TransportRegistry::with_http(http);
        Self { options, registry }
    }

    /// Resolver using a caller-built registry as is.
    pub fn with_registry(options: ResolveOptions, registry: TransportRegistry) -> Self {
        Self { options, registry }
    }

    /// Add or replace the transport for its scheme.
    pub fn register(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.registry.register(transport);
        self
    }

    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `id` (`path`, `url`, or either followed by `!entry`) to a local path.
    pub fn resolve(&self, id: &str) -> Result<PathBuf> {
        let ident = Identifier::parse(id)?;
        tracing::debug!(identifier = id, remote = ident.is_remote(), "resolving");

        if ident.is_remote() {
            // Unknown schemes fail before anything touches the cache root.
            let transport = self.transport_for(&ident.base)?;
            let store = self.open_store()?;
            let cached = remote::fetch_cached(self, &store, transport.as_ref(), &ident.base)?;
            return extract::finish(&store, &self.options, cached, ident.entry.as_deref());
        }

        let local = PathBuf::from(&ident.base);
        if !local.exists() {
            return Err(CachedPathError::NotFound(local));
        }
        if !needs_extraction(&self.options, &local, ident.entry.is_some()) {
            return Ok(local);
        }
        let store = self.open_store()?;
        extract::finish(&store, &self.options, local, ident.entry.as_deref())
    }

    fn transport_for(&self, uri: &str) -> Result<Arc<dyn Transport>> {
        let scheme = identifier::scheme(uri);
        self.registry
            .lookup(&scheme)
            .ok_or(CachedPathError::UnsupportedScheme(scheme))
    }

    fn open_store(&self) -> Result<CacheStore> {
        CacheStore::open(self.options.cache_root()?)
    }
}

/// Whether the final step touches the cache root at all.
fn needs_extraction(options: &ResolveOptions, path: &Path, has_entry: bool) -> bool {
    has_entry || (options.extract_archive && crate::archive::is_archive(path))
}

/// One-shot resolution with a fresh [`Resolver`].
pub fn resolve(id: &str, options: &ResolveOptions) -> Result<PathBuf> {
    Resolver::new(options.clone()).resolve(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Headers, TransferError};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory transport for `mem://host/...`.
    struct Memory {
        body: Vec<u8>,
        revision: String,
        fetches: AtomicUsize,
    }

    impl Transport for Memory {
        fn scheme(&self) -> &str {
            "mem"
        }

        fn fetch_into(&self, _uri: &str, sink: &mut dyn Write, _h: &Headers) -> std::result::Result<u64, TransferError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            sink.write_all(&self.body).map_err(TransferError::Sink)?;
            Ok(self.body.len() as u64)
        }

        fn probe_size(&self, _uri: &str, _h: &Headers) -> std::result::Result<u64, TransferError> {
            Ok(self.body.len() as u64)
        }

        fn probe_revision(&self, _uri: &str, _h: &Headers) -> std::result::Result<String, TransferError> {
            Ok(self.revision.clone())
        }
    }

    fn options(dir: &Path) -> ResolveOptions {
        ResolveOptions::builder().cache_dir(dir.join("cache")).quiet(true).build()
    }

    #[test]
    fn local_missing_is_not_found_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve("/no/such/file", &options(dir.path())).unwrap_err();
        assert!(matches!(err, CachedPathError::NotFound(ref p) if p == Path::new("/no/such/file")));
        assert!(!dir.path().join("cache").exists());
    }

    #[test]
    fn local_plain_file_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("weights.bin");
        std::fs::write(&f, b"w").unwrap();
        let got = resolve(f.to_str().unwrap(), &options(dir.path())).unwrap();
        assert_eq!(got, f);
    }

    #[test]
    fn entry_on_non_archive_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("plain.bin");
        std::fs::write(&f, b"w").unwrap();
        let id = format!("{}!inner.txt", f.display());
        let err = resolve(&id, &options(dir.path())).unwrap_err();
        assert!(matches!(err, CachedPathError::ExtractionFailed { .. }));
    }

    #[test]
    fn empty_entry_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve("archive.zip!", &options(dir.path())).unwrap_err();
        assert!(matches!(err, CachedPathError::InvalidIdentifier { .. }));
    }

    #[test]
    fn unknown_scheme_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve("ftp://host/file.bin", &options(dir.path())).unwrap_err();
        assert!(matches!(err, CachedPathError::UnsupportedScheme(ref s) if s == "ftp"));
        assert!(!dir.path().join("cache").exists());
    }

    #[test]
    fn entry_extraction_does_not_count_as_full_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("archive.tar.gz");
        crate::archive::testutil::write_tar_gz(
            &archive,
            &[("weights/model.bin", b"W", 0o644), ("other.txt", b"o", 0o644)],
        );
        let id = archive.to_string_lossy().into_owned();

        let entry = resolve(&format!("{id}!weights/model.bin"), &options(dir.path())).unwrap();
        assert_eq!(std::fs::read(&entry).unwrap(), b"W");

        let opts = ResolveOptions::builder()
            .cache_dir(dir.path().join("cache"))
            .extract_archive(true)
            .build();
        let full = resolve(&id, &opts).unwrap();
        assert_eq!(full, entry.parent().unwrap());
        assert_eq!(std::fs::read(full.join("weights/model.bin")).unwrap(), b"W");
        assert_eq!(std::fs::read(full.join("other.txt")).unwrap(), b"o");
        assert!(full.join(extract::COMPLETE_MARKER).is_file());

        // Entry lookups keep working inside a completed extraction.
        let again = resolve(&format!("{id}!weights/model.bin"), &options(dir.path())).unwrap();
        assert_eq!(again, entry);
        assert!(full.join("other.txt").exists());
    }

    #[test]
    fn custom_transport_fetches_once_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let mem = Arc::new(Memory {
            body: b"payload".to_vec(),
            revision: "r1".to_string(),
            fetches: AtomicUsize::new(0),
        });
        let mut resolver = Resolver::new(options(dir.path()));
        resolver.register(mem.clone());
        assert_eq!(resolver.registry().schemes(), vec!["http", "mem"]);

        let first = resolver.resolve("mem://host/data/f.bin").unwrap();
        let second = resolver.resolve("mem://host/data/f.bin").unwrap();
        assert_eq!(first, second);
        assert_eq!(mem.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read(&first).unwrap(), b"payload");
        assert!(first.to_string_lossy().ends_with(".bin"));
    }
}
