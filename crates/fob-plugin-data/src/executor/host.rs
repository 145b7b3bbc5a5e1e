//! Host services for loader code: file access, module resolution and logging.
//!
//! A [`Session`] lives for one loader evaluation. Every file loader code
//! touches, whether imported, required, read, listed or probed, is recorded
//! as a dependency of the result. The JavaScript side of the node built-ins
//! lives in `prelude.js`; the functions here are its only way out of the
//! sandbox.

use indexmap::IndexSet;
use parking_lot::Mutex;
use path_clean::PathClean;
use rquickjs::{Ctx, Function, Object};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::config::BuildConfig;
use crate::error::DataError;
use crate::filter::normalize_path;
use crate::store::ModuleId;

use super::resolve::{Resolved, Resolver};
use super::transpile::transpile;

const PRELUDE: &str = include_str!("prelude.js");

/// Node built-in modules available to loaders and their named exports
pub(crate) const BUILTIN_MODULES: &[(&str, &[&str])] = &[
    ("fs", &["readFileSync", "existsSync", "readdirSync", "statSync", "promises"]),
    ("fs/promises", &["readFile", "readdir", "stat", "access"]),
    ("path", PATH_EXPORTS),
    ("path/posix", PATH_EXPORTS),
    ("url", &["URL", "fileURLToPath", "pathToFileURL"]),
    ("process", &["cwd", "env"]),
    ("module", &["createRequire"]),
];

const PATH_EXPORTS: &[&str] = &[
    "sep", "delimiter", "isAbsolute", "normalize", "join", "resolve", "dirname", "basename",
    "extname", "relative", "posix",
];

/// State shared between the module loader and the native functions
#[derive(Debug)]
pub(crate) struct Session {
    root: PathBuf,
    resolver: Resolver,
    dependencies: Mutex<IndexSet<ModuleId>>,
    /// First host-side failure; it explains the exception QuickJS reports.
    failure: Mutex<Option<DataError>>,
}

impl Session {
    pub fn new(config: &BuildConfig) -> Arc<Self> {
        Arc::new(Self {
            root: config.root.clone(),
            resolver: Resolver::new(config),
            dependencies: Mutex::new(IndexSet::new()),
            failure: Mutex::new(None),
        })
    }

    pub fn track(&self, path: &Path) {
        self.dependencies.lock().insert(ModuleId::new(path));
    }

    pub fn dependencies(&self) -> IndexSet<ModuleId> {
        self.dependencies.lock().clone()
    }

    pub fn fail(&self, error: DataError) {
        self.failure.lock().get_or_insert(error);
    }

    pub fn take_failure(&self) -> Option<DataError> {
        self.failure.lock().take()
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> crate::error::Result<Resolved> {
        self.resolver.resolve(specifier, importer)
    }

    /// Paths from loader code are relative to the project root.
    pub fn absolute(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.root.join(path).clean()
        }
    }

    pub fn read_source(&self, path: &Path) -> crate::error::Result<String> {
        self.track(path);
        fs::read_to_string(path).map_err(|e| DataError::io(path, e))
    }

    fn read(&self, raw: &str) -> String {
        let path = self.absolute(raw);
        self.track(&path);
        reply(fs::read_to_string(&path).map(Value::String), &path)
    }

    fn exists(&self, raw: &str) -> bool {
        let path = self.absolute(raw);
        self.track(&path);
        path.exists()
    }

    fn readdir(&self, raw: &str) -> String {
        let path = self.absolute(raw);
        self.track(&path);
        let listing = fs::read_dir(&path).and_then(|entries| {
            let mut names = Vec::new();
            for entry in entries {
                let entry = entry?;
                let kind = entry.file_type()?;
                names.push(json!({
                    "name": entry.file_name().to_string_lossy(),
                    "kind": file_kind(kind.is_file(), kind.is_dir()),
                }));
            }
            names.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
            Ok(Value::Array(names))
        });
        reply(listing, &path)
    }

    fn stat(&self, raw: &str) -> String {
        let path = self.absolute(raw);
        self.track(&path);
        let meta = fs::metadata(&path).map(|meta| {
            let mtime_ms = meta
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|elapsed| elapsed.as_millis() as f64)
                .unwrap_or(0.0);
            json!({
                "size": meta.len(),
                "mtimeMs": mtime_ms,
                "kind": file_kind(meta.is_file(), meta.is_dir()),
            })
        });
        reply(meta, &path)
    }

    /// Source of a CommonJS module body, ready for the `require` wrapper
    fn commonjs(&self, raw: &str) -> String {
        let path = self.absolute(raw);
        match self.read_source(&path).and_then(|source| transpile(&path, &source)) {
            Ok(code) => json!({ "ok": code }).to_string(),
            Err(error) => failure("ERR_LOAD", &error.to_string()),
        }
    }

    fn require_resolve(&self, specifier: &str, importer: &str) -> String {
        match self.resolve(specifier, Path::new(importer)) {
            Ok(Resolved::File(path)) => json!({ "ok": normalize_path(&path) }).to_string(),
            Ok(Resolved::Builtin(name)) => json!({ "ok": format!("node:{name}") }).to_string(),
            Err(error) => failure("MODULE_NOT_FOUND", &error.to_string()),
        }
    }

    fn log(&self, level: &str, message: &str) {
        match level {
            "error" => tracing::error!(target: "fob_data::loader", "{message}"),
            "warn" => tracing::warn!(target: "fob_data::loader", "{message}"),
            "debug" => tracing::debug!(target: "fob_data::loader", "{message}"),
            _ => tracing::info!(target: "fob_data::loader", "{message}"),
        }
    }
}

fn file_kind(is_file: bool, is_dir: bool) -> &'static str {
    match (is_file, is_dir) {
        (true, _) => "file",
        (_, true) => "dir",
        _ => "other",
    }
}

/// `{ "ok": value }` or a Node-style error description
fn reply(result: std::io::Result<Value>, path: &Path) -> String {
    match result {
        Ok(value) => json!({ "ok": value }).to_string(),
        Err(error) => {
            let code = match error.kind() {
                std::io::ErrorKind::NotFound => "ENOENT",
                std::io::ErrorKind::PermissionDenied => "EACCES",
                _ if path.is_dir() => "EISDIR",
                _ => "EIO",
            };
            let message = match code {
                "ENOENT" => "no such file or directory",
                "EACCES" => "permission denied",
                "EISDIR" => "illegal operation on a directory",
                _ => "i/o error",
            };
            failure(code, message)
        }
    }
}

fn failure(code: &str, message: &str) -> String {
    json!({ "code": code, "message": message }).to_string()
}

/// Install the native bindings and run the prelude in `ctx`.
pub(crate) fn install<'js>(ctx: &Ctx<'js>, session: &Arc<Session>, defines: &str) -> rquickjs::Result<()> {
    let native = Object::new(ctx.clone())?;

    let s = Arc::clone(session);
    native.set("read", Function::new(ctx.clone(), move |path: String| s.read(&path))?)?;
    let s = Arc::clone(session);
    native.set("exists", Function::new(ctx.clone(), move |path: String| s.exists(&path))?)?;
    let s = Arc::clone(session);
    native.set("readdir", Function::new(ctx.clone(), move |path: String| s.readdir(&path))?)?;
    let s = Arc::clone(session);
    native.set("stat", Function::new(ctx.clone(), move |path: String| s.stat(&path))?)?;
    let s = Arc::clone(session);
    native.set("commonjs", Function::new(ctx.clone(), move |path: String| s.commonjs(&path))?)?;
    let s = Arc::clone(session);
    native.set(
        "resolve",
        Function::new(ctx.clone(), move |specifier: String, importer: String| {
            s.require_resolve(&specifier, &importer)
        })?,
    )?;
    let s = Arc::clone(session);
    native.set(
        "log",
        Function::new(ctx.clone(), move |level: String, message: String| s.log(&level, &message))?,
    )?;

    let globals = ctx.globals();
    globals.set("__fob_native", native)?;
    globals.set("__fob_root", normalize_path(&session.root))?;
    globals.set("__fob_define", defines.to_string())?;
    ctx.eval::<(), _>(PRELUDE)
}

/// ESM facade over a built-in living on `globalThis.__fob.builtins`.
///
/// Every named export gets its own declaration: QuickJS registers no
/// bindings for a destructuring `export const { .. } = m`.
pub(crate) fn builtin_source(name: &str) -> Option<String> {
    let (name, exports) = BUILTIN_MODULES.iter().find(|(builtin, _)| *builtin == name)?;
    let quoted = Value::String(name.to_string());
    let mut source = format!("const m = globalThis.__fob.builtins[{quoted}];\nexport default m;\n");
    for export in exports.iter() {
        source.push_str(&format!("export const {export} = m.{export};\n"));
    }
    Some(source)
}
