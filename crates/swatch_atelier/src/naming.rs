//! Emitted class name generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha512};
use swatch_carton::ident::{into_css_ident, push_sanitized};
use swatch_carton::CompactString;

use crate::options::NamingScheme;

/// Bumped whenever the hashed scheme's input changes, so old and new names
/// never mix in one cache.
pub const SCHEME_VERSION: u32 = 1;

/// Characters of the base64 digest kept by the hashed scheme.
pub const HASH_LENGTH: usize = 5;

/// Normalize a module path: forward slashes, no leading `./` or `/`.
pub fn normalize_module_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_string();
    }
    path.trim_start_matches('/').to_string()
}

/// Emitted name for `local` declared in the module at `module_path`.
pub fn emitted_name(scheme: NamingScheme, module_path: &str, local: &str) -> String {
    LocalNamer::new(scheme, &normalize_module_path(module_path))
        .name(local)
        .into()
}

/// Names the locals of one module.
pub(crate) struct LocalNamer<'a> {
    scheme: NamingScheme,
    module_path: &'a str,
    /// `[path][name]__`, precomputed for the readable scheme
    readable_prefix: String,
}

impl<'a> LocalNamer<'a> {
    /// `module_path` must already be normalized.
    pub(crate) fn new(scheme: NamingScheme, module_path: &'a str) -> Self {
        let readable_prefix = match scheme {
            NamingScheme::Readable => readable_prefix(module_path),
            NamingScheme::Hashed => String::new(),
        };
        Self {
            scheme,
            module_path,
            readable_prefix,
        }
    }

    pub(crate) fn name(&self, local: &str) -> CompactString {
        let name = match self.scheme {
            NamingScheme::Readable => {
                let mut name = String::with_capacity(self.readable_prefix.len() + local.len());
                name.push_str(&self.readable_prefix);
                push_sanitized(&mut name, local);
                name
            }
            NamingScheme::Hashed => hashed_name(self.module_path, local),
        };
        CompactString::from(into_css_ident(name))
    }
}

fn readable_prefix(module_path: &str) -> String {
    let (dir, file) = match module_path.rfind('/') {
        Some(pos) => module_path.split_at(pos + 1),
        None => ("", module_path),
    };
    let stem = match file.rfind('.') {
        Some(pos) if pos > 0 => &file[..pos],
        _ => file,
    };

    let mut prefix = String::with_capacity(dir.len() + stem.len() + 2);
    push_sanitized(&mut prefix, dir);
    push_sanitized(&mut prefix, stem);
    prefix.push_str("__");
    prefix
}

fn hashed_name(module_path: &str, local: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(module_path.as_bytes());
    hasher.update([0u8]);
    hasher.update(local.as_bytes());
    hasher.update([0u8]);
    hasher.update(format!("v{}", SCHEME_VERSION).as_bytes());
    let digest = hasher.finalize();

    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    // The URL-safe alphabet is ASCII, so byte truncation is a char boundary.
    encoded.truncate(HASH_LENGTH);
    encoded
}
