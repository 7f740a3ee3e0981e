//! Build command - Compile CSS modules into stylesheets and style maps

use clap::{Args, ValueEnum};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use swatch_atelier::{
    compile_style_module, CompileOptions, NamingScheme, ScopeMode, StyleModule, SCHEME_VERSION,
};
use swatch_carton::hash::{content_hash, fingerprint};

use crate::config::{load_config, Env};

/// Manifest file written next to the build outputs.
pub const MANIFEST_FILE: &str = "swatch-manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Output rewritten CSS, source map and a JavaScript style map module
    #[default]
    Js,
    /// Output one JSON document per stylesheet
    Json,
    /// Only show statistics (no output)
    Stats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemeArg {
    /// Short digest names
    Hashed,
    /// `[path][name]__[local]` names
    Readable,
}

impl From<SchemeArg> for NamingScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Hashed => NamingScheme::Hashed,
            SchemeArg::Readable => NamingScheme::Readable,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// Only `:local(...)` names are renamed
    Global,
    /// Everything outside `:global(...)` is renamed
    Local,
}

impl From<ScopeArg> for ScopeMode {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Global => ScopeMode::Global,
            ScopeArg::Local => ScopeMode::Local,
        }
    }
}

#[derive(Args)]
pub struct BuildArgs {
    /// Glob pattern(s) relative to the root (default: every .css file)
    pub patterns: Vec<String>,

    /// Project root to search for stylesheets
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output directory (default: ./dist)
    #[arg(short, long, default_value = "./dist")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "js")]
    pub format: OutputFormat,

    /// Option preset (overrides `env` in swatch.config.json)
    #[arg(long, value_enum)]
    pub env: Option<Env>,

    /// Naming scheme for emitted class names
    #[arg(long, value_enum)]
    pub scheme: Option<SchemeArg>,

    /// Default scoping of class and id selectors
    #[arg(long, value_enum)]
    pub scope_mode: Option<ScopeArg>,

    /// Generate source maps (readable scheme only)
    #[arg(long, value_name = "BOOL")]
    pub source_map: Option<bool>,

    /// Minify the rewritten CSS
    #[arg(long, value_name = "BOOL")]
    pub minify: Option<bool>,

    /// Identifier emitted names must not reuse (repeatable)
    #[arg(long = "reserved", value_name = "NAME")]
    pub reserved: Vec<String>,

    /// Number of threads (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Skip stylesheets unchanged since the last build
    #[arg(long)]
    pub incremental: bool,

    /// Continue on errors
    #[arg(long)]
    pub continue_on_error: bool,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            root: PathBuf::from("."),
            output: PathBuf::from("./dist"),
            format: OutputFormat::default(),
            env: None,
            scheme: None,
            scope_mode: None,
            source_map: None,
            minify: None,
            reserved: Vec::new(),
            threads: None,
            incremental: false,
            continue_on_error: false,
        }
    }
}

/// Fatal build errors. Per-file compile failures are reported in
/// [`BuildSummary::failures`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Cannot read project root {}: {source}", path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No .css files found under {}", root.display())]
    NoFiles { root: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Per-module record in `swatch-manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// xxh3 hash of the stylesheet source
    pub content_hash: String,
    /// Files written for this module, relative to the output directory
    pub outputs: Vec<String>,
    /// Number of exported local names
    pub exports: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Fingerprint of the options every entry was built with
    pub fingerprint: String,
    pub modules: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable manifest {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// The entry for `module_path` if it was built from the same source and
    /// options and its outputs still exist.
    fn fresh_entry(
        &self,
        fingerprint: &str,
        module_path: &str,
        content_hash: &str,
        out_dir: &Path,
    ) -> Option<&ManifestEntry> {
        if self.fingerprint != fingerprint {
            return None;
        }
        let entry = self.modules.get(module_path)?;
        let fresh = entry.content_hash == content_hash
            && entry.outputs.iter().all(|out| out_dir.join(out).is_file());
        fresh.then_some(entry)
    }
}

#[derive(Debug)]
struct BuildStats {
    success: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    total_bytes: AtomicUsize,
}

impl BuildStats {
    fn new() -> Self {
        Self {
            success: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            total_bytes: AtomicUsize::new(0),
        }
    }
}

/// Outcome of one `swatch build` run.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub compiled: usize,
    pub skipped: usize,
    pub total_bytes: usize,
    /// `(module path, message)` for every stylesheet that failed
    pub failures: Vec<(String, String)>,
    /// Whether outputs were written (false on abort or `--format stats`)
    pub written: bool,
}

enum Outcome {
    Compiled {
        module_path: String,
        content_hash: String,
        module: StyleModule,
    },
    Skipped {
        module_path: String,
        entry: ManifestEntry,
    },
    Failed {
        module_path: String,
        message: String,
    },
}

pub fn run(args: BuildArgs) {
    let start = Instant::now();

    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            tracing::warn!("Failed to configure thread pool: {}", e);
        }
    }

    let summary = match build(&args) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    for (module_path, message) in &summary.failures {
        eprintln!("Error compiling {}: {}", module_path, message);
    }

    if !summary.failures.is_empty() {
        eprintln!(
            "✗ {} file(s) failed, {} compiled in {:.4}s",
            summary.failures.len(),
            summary.compiled,
            elapsed.as_secs_f64()
        );
        if !summary.written && !args.continue_on_error {
            eprintln!("  No output written (use --continue-on-error to keep going)");
        }
        std::process::exit(1);
    }

    let file_word = if summary.compiled == 1 {
        "file"
    } else {
        "files"
    };
    if summary.skipped > 0 {
        eprintln!(
            "✓ {} {} compiled, {} unchanged in {:.4}s",
            summary.compiled,
            file_word,
            summary.skipped,
            elapsed.as_secs_f64()
        );
    } else {
        eprintln!(
            "✓ {} {} compiled in {:.4}s",
            summary.compiled,
            file_word,
            elapsed.as_secs_f64()
        );
    }
}

/// Compile every matching stylesheet under `args.root` and write the outputs.
pub fn build(args: &BuildArgs) -> Result<BuildSummary, BuildError> {
    let root = fs::canonicalize(&args.root).map_err(|source| BuildError::Root {
        path: args.root.clone(),
        source,
    })?;
    let options = resolve_options(args);
    let options_fingerprint = options_fingerprint(&options, args.format);

    let out_dir = &args.output;
    let exclude = fs::canonicalize(out_dir).ok();
    let files = collect_files(&root, &args.patterns, exclude.as_deref());
    if files.is_empty() {
        return Err(BuildError::NoFiles { root });
    }

    let manifest_path = out_dir.join(MANIFEST_FILE);
    let previous = args
        .incremental
        .then(|| Manifest::load(&manifest_path));

    tracing::debug!(
        files = files.len(),
        scheme = ?options.scheme,
        scope_mode = ?options.scope_mode,
        "building style modules"
    );

    let stats = BuildStats::new();
    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|(path, module_path)| {
            let outcome = compile_file(
                path,
                module_path,
                &options,
                previous.as_ref(),
                &options_fingerprint,
                out_dir,
            );
            match &outcome {
                Outcome::Compiled { module, .. } => {
                    stats.success.fetch_add(1, Ordering::Relaxed);
                    stats.total_bytes.fetch_add(module.css.len(), Ordering::Relaxed);
                }
                Outcome::Skipped { .. } => {
                    stats.skipped.fetch_add(1, Ordering::Relaxed);
                }
                Outcome::Failed { .. } => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            outcome
        })
        .collect();

    let mut summary = BuildSummary {
        compiled: stats.success.load(Ordering::Relaxed),
        skipped: stats.skipped.load(Ordering::Relaxed),
        total_bytes: stats.total_bytes.load(Ordering::Relaxed),
        ..Default::default()
    };

    let mut manifest = Manifest {
        fingerprint: options_fingerprint,
        modules: BTreeMap::new(),
    };
    let mut compiled = Vec::with_capacity(summary.compiled);
    for outcome in outcomes {
        match outcome {
            Outcome::Compiled {
                module_path,
                content_hash,
                module,
            } => compiled.push((module_path, content_hash, module)),
            Outcome::Skipped { module_path, entry } => {
                manifest.modules.insert(module_path, entry);
            }
            Outcome::Failed {
                module_path,
                message,
            } => summary.failures.push((module_path, message)),
        }
    }

    if args.format == OutputFormat::Stats
        || (stats.failed.load(Ordering::Relaxed) > 0 && !args.continue_on_error)
    {
        return Ok(summary);
    }

    create_dir(out_dir)?;
    for (module_path, content_hash, module) in compiled {
        let outputs = write_module(out_dir, &module_path, &module, args.format)?;
        manifest.modules.insert(
            module_path,
            ManifestEntry {
                content_hash,
                outputs,
                exports: module.styles.len(),
            },
        );
    }

    let manifest_json = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    write_file(&manifest_path, manifest_json)?;
    summary.written = true;

    Ok(summary)
}

/// Options from `swatch.config.json` under the root, overridden by flags.
fn resolve_options(args: &BuildArgs) -> CompileOptions {
    let mut config = load_config(Some(&args.root));
    if let Some(env) = args.env {
        config.env = Some(env);
    }
    if let Some(scheme) = args.scheme {
        config.scheme = Some(scheme.into());
    }
    if let Some(scope_mode) = args.scope_mode {
        config.scope_mode = Some(scope_mode.into());
    }
    if let Some(source_map) = args.source_map {
        config.source_map = Some(source_map);
    }
    if let Some(minify) = args.minify {
        config.minify = Some(minify);
    }
    config.reserved.extend(args.reserved.iter().cloned());
    config.compile_options()
}

fn options_fingerprint(options: &CompileOptions, format: OutputFormat) -> String {
    let options_json = serde_json::to_string(options).unwrap_or_default();
    let format = format!("{:?}", format);
    let version = SCHEME_VERSION.to_string();
    fingerprint([options_json.as_str(), format.as_str(), version.as_str()])
}

/// `(absolute path, module path)` for every `.css` file under `root`,
/// sorted by module path.
fn collect_files(root: &Path, patterns: &[String], exclude: Option<&Path>) -> Vec<(PathBuf, String)> {
    let globs: Vec<glob::Pattern> = patterns
        .iter()
        .filter_map(|pattern| {
            match glob::Pattern::new(pattern.trim_start_matches("./")) {
                Ok(glob) => Some(glob),
                Err(e) => {
                    tracing::warn!("Ignoring invalid pattern {}: {}", pattern, e);
                    None
                }
            }
        })
        .collect();
    if !patterns.is_empty() && globs.is_empty() {
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build().flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "css")
            || !entry.file_type().is_some_and(|ty| ty.is_file())
            || exclude.is_some_and(|out| path.starts_with(out))
        {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let module_path = relative.to_string_lossy().replace('\\', "/");
        if !globs.is_empty() && !globs.iter().any(|glob| glob.matches(&module_path)) {
            continue;
        }
        files.push((path.to_path_buf(), module_path));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    files.dedup_by(|a, b| a.1 == b.1);
    files
}

fn compile_file(
    path: &Path,
    module_path: &str,
    base: &CompileOptions,
    previous: Option<&Manifest>,
    options_fingerprint: &str,
    out_dir: &Path,
) -> Outcome {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return Outcome::Failed {
                module_path: module_path.to_string(),
                message: format!("Failed to read file: {}", e),
            }
        }
    };

    let content_hash = content_hash(&source);
    if let Some(entry) = previous
        .and_then(|m| m.fresh_entry(options_fingerprint, module_path, &content_hash, out_dir))
    {
        tracing::debug!(module = module_path, "unchanged, skipping");
        return Outcome::Skipped {
            module_path: module_path.to_string(),
            entry: entry.clone(),
        };
    }

    let options = CompileOptions {
        filename: Some(module_path.to_string()),
        ..base.clone()
    };
    match compile_style_module(&source, &options) {
        Ok(module) => Outcome::Compiled {
            module_path: module_path.to_string(),
            content_hash,
            module,
        },
        Err(e) => Outcome::Failed {
            module_path: module_path.to_string(),
            message: e.to_string(),
        },
    }
}

/// Write the outputs of one module and return their paths relative to
/// `out_dir`.
fn write_module(
    out_dir: &Path,
    module_path: &str,
    module: &StyleModule,
    format: OutputFormat,
) -> Result<Vec<String>, BuildError> {
    let mut outputs = Vec::new();
    let mut emit = |relative: String, content: String| -> Result<(), BuildError> {
        let path = out_dir.join(&relative);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        write_file(&path, content)?;
        outputs.push(relative);
        Ok(())
    };

    match format {
        OutputFormat::Stats => {}
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(module).unwrap_or_default();
            emit(format!("{}.json", module_path), json)?;
        }
        OutputFormat::Js => {
            let mut css = module.css.clone();
            if let Some(map) = &module.map {
                let map_name = format!("{}.map", file_name(module_path));
                if !css.is_empty() && !css.ends_with('\n') {
                    css.push('\n');
                }
                css.push_str(&format!("/*# sourceMappingURL={} */\n", map_name));
                emit(format!("{}.map", module_path), map.clone())?;
            }
            emit(module_path.to_string(), css)?;
            emit(format!("{}.js", module_path), module.to_js_module())?;
        }
    }

    Ok(outputs)
}

fn file_name(module_path: &str) -> &str {
    module_path
        .rsplit_once('/')
        .map_or(module_path, |(_, name)| name)
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: String) -> Result<(), BuildError> {
    fs::write(path, content).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
