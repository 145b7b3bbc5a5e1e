//! QuickJS module resolution and loading for loader evaluation.
//!
//! Module names are normalized absolute paths, or `node:<name>` for the
//! built-ins. Host failures are parked on the [`Session`] so the executor can
//! report them as typed errors instead of the engine's generic exception.

use rquickjs::loader::{Loader, Resolver};
use rquickjs::{Ctx, Error, Module, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::error::DataError;
use crate::filter::normalize_path;

use super::host::{builtin_source, Session};
use super::resolve::Resolved;
use super::transpile::transpile;

#[derive(Debug)]
pub(crate) struct SessionResolver {
    session: Arc<Session>,
}

impl SessionResolver {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl Resolver for SessionResolver {
    fn resolve<'js>(&mut self, _ctx: &Ctx<'js>, base: &str, name: &str) -> Result<String> {
        match self.session.resolve(name, Path::new(base)) {
            Ok(Resolved::Builtin(builtin)) => Ok(format!("node:{builtin}")),
            Ok(Resolved::File(path)) => Ok(normalize_path(&path)),
            Err(error) => {
                self.session.fail(error);
                Err(Error::new_resolving(base, name))
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct SessionLoader {
    session: Arc<Session>,
}

impl SessionLoader {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    fn source(&self, name: &str) -> crate::error::Result<String> {
        if let Some(builtin) = name.strip_prefix("node:") {
            return builtin_source(builtin)
                .ok_or_else(|| DataError::resolve(name, "<builtin>"));
        }

        let path = Path::new(name);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let quoted = Value::String(name.to_string());

        match extension.as_str() {
            "json" => {
                let source = self.session.read_source(path)?;
                serde_json::from_str::<Value>(&source)
                    .map_err(|e| DataError::compilation(path, e.to_string()))?;
                Ok(format!("export default {source};"))
            }
            "cjs" | "cts" => {
                self.session.track(path);
                Ok(format!("export default globalThis.__fob.loadCommonJs({quoted});"))
            }
            _ => {
                let source = self.session.read_source(path)?;
                let code = transpile(path, &source)?;
                Ok(format!("{}{code}", import_meta(name)))
            }
        }
    }
}

impl Loader for SessionLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, name: &str) -> Result<Module<'js>> {
        match self.source(name) {
            Ok(source) => Module::declare(ctx.clone(), name, source),
            Err(error) => {
                self.session.fail(error);
                Err(Error::new_loading(name))
            }
        }
    }
}

/// `import.meta.{url,filename,dirname}` as Node reports them, on one line
fn import_meta(name: &str) -> String {
    let dirname = Path::new(name)
        .parent()
        .map(normalize_path)
        .unwrap_or_else(|| "/".to_string());
    let url = Value::String(format!("file://{name}"));
    let filename = Value::String(name.to_string());
    let dirname = Value::String(dirname);
    format!(
        "import.meta.url = {url}; import.meta.filename = {filename}; import.meta.dirname = {dirname};\n"
    )
}
