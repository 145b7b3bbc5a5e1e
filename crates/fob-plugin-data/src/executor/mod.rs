//! Loader evaluation.
//!
//! Loader modules run on an embedded QuickJS engine (`rquickjs`), one fresh
//! runtime per evaluation. TypeScript is stripped with oxc on the way in,
//! imports resolve through the build config's aliases and extensions, and
//! the Node built-ins loaders lean on (`fs`, `path`, `url`, `process`,
//! `module`) are provided by a small host layer. Every module loaded and
//! every file read, listed or probed is recorded as a dependency.
//!
//! [`LoaderExecutor`] is the seam between the plugin and the engine, so hosts
//! can plug in a different strategy (or a fake, in tests).

mod capture;
mod host;
mod loader;
mod resolve;
mod transpile;

use async_trait::async_trait;
use path_clean::PathClean;
use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Module, Runtime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

use crate::config::BuildConfig;
use crate::error::{DataError, Result};
use crate::filter::normalize_path;
use crate::store::{LoaderResult, ModuleId};
use crate::value::Exports;

use self::host::Session;
use self::loader::{SessionLoader, SessionResolver};

/// Stack reserved for the evaluation thread
const LOADER_STACK_SIZE: usize = 16 * 1024 * 1024;
/// Engine stack budget, below the thread's so overflow stays a JS exception
const MAX_STACK_SIZE: usize = 8 * 1024 * 1024;
const DEFAULT_MEMORY_LIMIT: usize = 1024 * 1024 * 1024;

const ENTRY_MODULE: &str = "fob:entry";
const SNAPSHOT_GLOBAL: &str = "__fob_snapshot";

/// Evaluates a loader module in isolation.
///
/// Each call must observe the files as they are now: implementations may not
/// reuse module state from an earlier evaluation.
#[async_trait]
pub trait LoaderExecutor: Send + Sync + std::fmt::Debug {
    async fn execute(&self, path: &Path, config: &BuildConfig) -> Result<LoaderResult>;
}

/// Executor backed by an embedded QuickJS engine.
#[derive(Debug, Clone, Copy)]
pub struct QuickJsExecutor {
    memory_limit: usize,
}

impl Default for QuickJsExecutor {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl QuickJsExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heap ceiling for one evaluation; allocations past it throw inside the loader.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Evaluate synchronously on a dedicated thread.
    pub fn evaluate(&self, path: &Path, config: &BuildConfig) -> Result<LoaderResult> {
        let memory_limit = self.memory_limit;
        let owned_path = path.to_path_buf();
        let owned_config = config.clone();

        spawn_loader_thread(path, move || run(&owned_path, &owned_config, memory_limit))?
            .join()
            .map_err(|_| DataError::evaluation(path, "loader evaluation panicked"))?
    }
}

#[async_trait]
impl LoaderExecutor for QuickJsExecutor {
    async fn execute(&self, path: &Path, config: &BuildConfig) -> Result<LoaderResult> {
        let memory_limit = self.memory_limit;
        let owned_path = path.to_path_buf();
        let owned_config = config.clone();
        let (tx, rx) = oneshot::channel();

        tracing::debug!(target: "fob_data::executor", path = %path.display(), "evaluating loader");

        spawn_loader_thread(path, move || {
            // The receiver only goes away when the host abandons the load.
            let _ = tx.send(run(&owned_path, &owned_config, memory_limit));
        })?;

        rx.await
            .map_err(|_| DataError::evaluation(path, "loader evaluation panicked"))?
    }
}

fn spawn_loader_thread<T, F>(path: &Path, job: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    std::thread::Builder::new()
        .name("fob-data-loader".to_string())
        .stack_size(LOADER_STACK_SIZE)
        .spawn(job)
        .map_err(|e| DataError::evaluation(path, format!("failed to start loader thread: {e}")))
}

/// Evaluate the loader at `path` and capture its exports and dependencies.
fn run(path: &Path, config: &BuildConfig, memory_limit: usize) -> Result<LoaderResult> {
    let path: PathBuf = if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        config.root.join(path).clean()
    };
    let defines = serde_json::to_string(&config.define).map_err(|e| DataError::Config(e.to_string()))?;

    let engine_error =
        |e: rquickjs::Error| DataError::evaluation(&path, format!("failed to start JavaScript engine: {e}"));
    let session = Session::new(config);
    let runtime = Runtime::new().map_err(engine_error)?;
    runtime.set_memory_limit(memory_limit);
    runtime.set_max_stack_size(MAX_STACK_SIZE);
    runtime.set_loader(
        SessionResolver::new(Arc::clone(&session)),
        SessionLoader::new(Arc::clone(&session)),
    );
    let context = Context::full(&runtime).map_err(engine_error)?;

    let exports = context.with(|ctx| evaluate_entry(&ctx, &session, &path, &defines))?;
    Ok(LoaderResult::new(ModuleId::new(&path), exports, session.dependencies()))
}

fn evaluate_entry<'js>(ctx: &Ctx<'js>, session: &Arc<Session>, entry: &Path, defines: &str) -> Result<Exports> {
    // A host-side failure explains the exception better than the exception itself.
    let fail = |caught: CaughtError<'js>| {
        session
            .take_failure()
            .unwrap_or_else(|| DataError::evaluation(entry, uncaught(&caught)))
    };

    host::install(ctx, session, defines).catch(ctx).map_err(fail)?;

    let specifier = serde_json::Value::String(normalize_path(entry));
    let source = format!(
        "import * as namespace from {specifier};\nglobalThis.{SNAPSHOT_GLOBAL} = globalThis.__fob.capture(namespace);\n"
    );
    let module = Module::declare(ctx.clone(), ENTRY_MODULE, source)
        .catch(ctx)
        .map_err(fail)?;
    let (_, promise) = module.eval().catch(ctx).map_err(fail)?;
    promise.finish::<()>().catch(ctx).map_err(fail)?;

    let snapshot: String = ctx.globals().get(SNAPSHOT_GLOBAL).catch(ctx).map_err(fail)?;
    capture::decode(&snapshot).map_err(|message| DataError::evaluation(entry, message))
}

fn uncaught(caught: &CaughtError<'_>) -> String {
    match caught {
        CaughtError::Exception(exception) => {
            let name = exception
                .as_object()
                .get::<_, Option<String>>("name")
                .ok()
                .flatten()
                .unwrap_or_else(|| "Error".to_string());
            match exception.message() {
                Some(message) if !message.is_empty() => format!("Uncaught {name}: {message}"),
                _ => format!("Uncaught {name}"),
            }
        }
        CaughtError::Value(value) => {
            let text = value
                .as_string()
                .and_then(|s| s.to_string().ok())
                .unwrap_or_else(|| format!("{value:?}"));
            format!("Uncaught {text}")
        }
        CaughtError::Error(error) => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ModuleId;
    use crate::value::ExportValue;
    use indexmap::IndexMap;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().to_path_buf()
        }

        fn file(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, contents).unwrap();
            path
        }

        fn config(&self) -> BuildConfig {
            BuildConfig::new(self.root())
        }

        fn run(&self, name: &str, contents: &str) -> Result<LoaderResult> {
            let path = self.file(name, contents);
            QuickJsExecutor::new().evaluate(&path, &self.config())
        }
    }

    fn export<'r>(result: &'r LoaderResult, name: &str) -> &'r ExportValue {
        result
            .exports
            .get(name)
            .unwrap_or_else(|| panic!("missing export `{name}`"))
    }

    fn json_of(result: &LoaderResult, name: &str) -> serde_json::Value {
        crate::compiler::to_json(name, export(result, name))
            .unwrap()
            .unwrap_or(serde_json::Value::Null)
    }

    #[test]
    fn evaluates_plain_exports() {
        let project = Project::new();
        let result = project
            .run(
                "a.data.ts",
                r#"
                const base: number = 40;
                export const answer = base + 2;
                export const greeting = `hello ${"world"}`;
                export default { list: [1, 2, 3].map((n) => n * 2), nested: { ok: true, none: null } };
                "#,
            )
            .unwrap();

        // Module namespace keys come back in code-unit order
        let names: Vec<_> = result.exports.keys().cloned().collect();
        assert_eq!(names, vec!["answer", "default", "greeting"]);
        assert_eq!(export(&result, "answer"), &ExportValue::Number(42.0));
        assert_eq!(json_of(&result, "greeting"), json!("hello world"));
        assert_eq!(
            json_of(&result, "default"),
            json!({ "list": [2, 4, 6], "nested": { "ok": true, "none": null } })
        );
    }

    #[test]
    fn class_instances_are_captured_with_their_type() {
        let project = Project::new();
        let result = project
            .run(
                "shapes.data.ts",
                r#"
                class Point {
                  constructor(public x: number, public y: number) {}
                }
                class Money {
                  #cents: number;
                  constructor(cents: number) { this.#cents = cents; }
                  toJSON() { return { cents: this.#cents }; }
                }
                export const point = new Point(1, 2);
                export const price = new Money(250);
                "#,
            )
            .unwrap();

        match export(&result, "point") {
            ExportValue::Instance { type_name, fields } => {
                assert_eq!(type_name, "Point");
                assert_eq!(fields.get("x"), Some(&ExportValue::Number(1.0)));
            }
            other => panic!("expected instance, got {other:?}"),
        }
        match export(&result, "price") {
            ExportValue::Serializable { type_name, json } => {
                assert_eq!(type_name, "Money");
                let mut expected = IndexMap::new();
                expected.insert("cents".to_string(), ExportValue::Number(250.0));
                assert_eq!(json.as_ref(), &ExportValue::Record(expected));
            }
            other => panic!("expected toJSON value, got {other:?}"),
        }
    }

    #[test]
    fn functions_and_symbols_are_captured_as_opaque() {
        let project = Project::new();
        let result = project
            .run(
                "opaque.data.js",
                "export function render() {}\nexport const tag = Symbol('tag');\nexport const big = 10n;\n",
            )
            .unwrap();

        assert_eq!(
            export(&result, "render"),
            &ExportValue::Function {
                name: Some("render".to_string())
            }
        );
        assert_eq!(
            export(&result, "tag"),
            &ExportValue::Symbol {
                description: Some("tag".to_string())
            }
        );
        assert_eq!(export(&result, "big"), &ExportValue::BigInt("10".to_string()));
    }

    #[test]
    fn imports_are_tracked_as_dependencies() {
        let project = Project::new();
        let util = project.file("src/util.ts", "export const double = (n: number) => n * 2;\n");
        let posts = project.file("src/posts.json", r#"[{ "title": "first" }, { "title": "second" }]"#);
        let result = project
            .run(
                "src/index.data.ts",
                r#"
                import { double } from './util';
                import posts from './posts.json';
                import type { Post } from './types';
                export const count = double(posts.length);
                export const titles = posts.map((p: Post) => p.title);
                "#,
            )
            .unwrap();

        assert_eq!(export(&result, "count"), &ExportValue::Number(4.0));
        assert_eq!(json_of(&result, "titles"), json!(["first", "second"]));
        assert!(result.depends_on(&ModuleId::new(&util)));
        assert!(result.depends_on(&ModuleId::new(&posts)));
        assert!(result.depends_on(&result.module_id.clone()));
    }

    #[test]
    fn fs_reads_are_tracked_and_relative_to_root() {
        let project = Project::new();
        let readme = project.file("content/readme.md", "# Title\nbody\n");
        let result = project
            .run(
                "src/readme.data.js",
                r#"
                import fs from 'node:fs';
                import { join } from 'node:path';
                const text = fs.readFileSync(join(process.cwd(), 'content/readme.md'), 'utf-8');
                export const heading = text.split('\n')[0].replace('# ', '');
                export const exists = fs.existsSync('content/missing.md');
                "#,
            )
            .unwrap();

        assert_eq!(json_of(&result, "heading"), json!("Title"));
        assert_eq!(export(&result, "exists"), &ExportValue::Bool(false));
        assert!(result.depends_on(&ModuleId::new(&readme)));
    }

    #[test]
    fn named_imports_from_builtins_link() {
        let project = Project::new();
        project.file("notes/a.txt", "alpha");
        let result = project
            .run(
                "builtins.data.mjs",
                r#"
                import { readFileSync, existsSync, readdirSync, statSync } from 'node:fs';
                import { readFile } from 'fs/promises';
                import { join, basename, extname, relative } from 'path';
                import { posix } from 'node:path';
                import { fileURLToPath, pathToFileURL } from 'node:url';
                import { cwd } from 'node:process';
                import { createRequire } from 'module';
                const require = createRequire(import.meta.url);
                const file = join(cwd(), 'notes', 'a.txt');
                export const text = readFileSync(file, 'utf8');
                export const later = await readFile(file, 'utf8');
                export const listed = readdirSync('notes');
                export const found = existsSync(file) && statSync(file).isFile();
                export const parts = [basename(file), extname(file), relative(cwd(), file), posix.sep];
                export const roundTrip = fileURLToPath(pathToFileURL(file)) === file;
                export const viaRequire = require('node:path').basename(file);
                "#,
            )
            .unwrap();

        assert_eq!(json_of(&result, "text"), json!("alpha"));
        assert_eq!(json_of(&result, "later"), json!("alpha"));
        assert_eq!(json_of(&result, "listed"), json!(["a.txt"]));
        assert_eq!(export(&result, "found"), &ExportValue::Bool(true));
        assert_eq!(json_of(&result, "parts"), json!(["a.txt", ".txt", "notes/a.txt", "/"]));
        assert_eq!(export(&result, "roundTrip"), &ExportValue::Bool(true));
        assert_eq!(json_of(&result, "viaRequire"), json!("a.txt"));
        assert!(result.depends_on(&ModuleId::new(project.root().join("notes/a.txt"))));
    }

    #[test]
    fn aliases_and_defines_come_from_config() {
        let project = Project::new();
        project.file("src/lib/site.ts", "export const name = 'docs';\n");
        let path = project.file(
            "pages/site.data.ts",
            r#"
            import { name } from '@/lib/site';
            export const title = `${name} (${process.env.NODE_ENV})`;
            export const version = __VERSION__;
            "#,
        );

        let mut config = project.config();
        config
            .resolve
            .alias
            .insert("@".into(), project.root().join("src").to_string_lossy().into_owned());
        config.define.insert("process.env.NODE_ENV".into(), json!("production"));
        config.define.insert("__VERSION__".into(), json!("1.2.3"));

        let result = QuickJsExecutor::new().evaluate(&path, &config).unwrap();
        assert_eq!(json_of(&result, "title"), json!("docs (production)"));
        assert_eq!(json_of(&result, "version"), json!("1.2.3"));
    }

    #[test]
    fn uncaught_throw_is_an_evaluation_error() {
        let project = Project::new();
        let err = project
            .run("boom.data.ts", "throw new TypeError('bad data');\n")
            .unwrap_err();

        assert!(matches!(err, DataError::Evaluation { .. }));
        assert!(err.to_string().contains("TypeError: bad data"), "{err}");
    }

    #[test]
    fn caught_errors_keep_their_message() {
        let project = Project::new();
        let result = project
            .run(
                "caught.data.ts",
                r#"
                import { readFileSync } from 'fs';
                let message = '';
                let code = '';
                try {
                  readFileSync('./nope.txt', 'utf8');
                } catch (e) {
                  message = e instanceof Error ? 'error' : 'other';
                  code = e.code;
                } finally {
                  message += '!';
                }
                export const result = { message, code };
                "#,
            )
            .unwrap();

        assert_eq!(json_of(&result, "result"), json!({ "message": "error!", "code": "ENOENT" }));
    }

    #[test]
    fn runaway_recursion_is_an_evaluation_error() {
        let project = Project::new();
        let err = project
            .run(
                "recurse.data.js",
                "function f(n) { return f(n + 1); }\nexport const x = f(0);\n",
            )
            .unwrap_err();

        assert!(matches!(err, DataError::Evaluation { .. }));
        assert!(err.to_string().to_lowercase().contains("stack"), "{err}");
    }

    #[test]
    fn recursion_within_the_limit_succeeds() {
        let project = Project::new();
        let result = project
            .run(
                "fib.data.js",
                "const fib = (n) => (n < 2 ? n : fib(n - 1) + fib(n - 2));\nexport const value = fib(15);\n",
            )
            .unwrap();
        assert_eq!(export(&result, "value"), &ExportValue::Number(610.0));
    }

    #[test]
    fn commonjs_modules_can_be_imported() {
        let project = Project::new();
        project.file(
            "lib/config.cjs",
            "const base = { port: 8080 };\nmodule.exports = { ...base, host: 'localhost' };\n",
        );
        let result = project
            .run(
                "server.data.mjs",
                "import config from './lib/config.cjs';\nexport const url = `http://${config.host}:${config.port}`;\n",
            )
            .unwrap();
        assert_eq!(json_of(&result, "url"), json!("http://localhost:8080"));
    }

    #[test]
    fn typescript_enums_and_annotations_evaluate() {
        let project = Project::new();
        let result = project
            .run(
                "enum.data.ts",
                r#"
                enum Level { Low = 1, High = 10 }
                interface Item { level: Level }
                type Items = Item[];
                const items: Items = [{ level: Level.Low }, { level: Level.High }];
                export const total = items.reduce((sum, item) => sum + item.level, 0) as number;
                export const name = Level[10];
                "#,
            )
            .unwrap();
        assert_eq!(export(&result, "total"), &ExportValue::Number(11.0));
        assert_eq!(json_of(&result, "name"), json!("High"));
    }

    #[test]
    fn maps_sets_and_regexes_work() {
        let project = Project::new();
        let result = project
            .run(
                "collections.data.js",
                r#"
                const counts = new Map();
                for (const word of 'a b a c b a'.split(' ')) {
                  counts.set(word, (counts.get(word) ?? 0) + 1);
                }
                const unique = new Set([3, 1, 3, 2]);
                export const frequencies = Object.fromEntries(counts);
                export const distinct = [...unique].sort();
                export const slug = 'Hello, World!'.toLowerCase().replace(/[^a-z]+/g, '-');
                "#,
            )
            .unwrap();

        assert_eq!(json_of(&result, "frequencies"), json!({ "a": 3, "b": 2, "c": 1 }));
        assert_eq!(json_of(&result, "distinct"), json!([1, 2, 3]));
        assert_eq!(json_of(&result, "slug"), json!("hello-world-"));
    }

    #[test]
    fn async_loaders_are_awaited() {
        let project = Project::new();
        let result = project
            .run(
                "async.data.ts",
                r#"
                import { readFile } from 'node:fs/promises';
                async function load() {
                  const raw = await readFile(new URL('./items.json', import.meta.url), 'utf8');
                  return JSON.parse(raw);
                }
                export default await load();
                "#,
            );
        // items.json is missing: the rejected read surfaces as an error
        assert!(result.is_err());

        project.file("items.json", r#"{ "items": [1, 2] }"#);
        let result = project
            .run(
                "async.data.ts",
                r#"
                import { readFile } from 'node:fs/promises';
                async function load() {
                  const raw = await readFile(new URL('./items.json', import.meta.url), 'utf8');
                  return JSON.parse(raw);
                }
                export default await load();
                "#,
            )
            .unwrap();
        assert_eq!(json_of(&result, "default"), json!({ "items": [1, 2] }));
    }

    #[test]
    fn circular_imports_follow_module_semantics() {
        let project = Project::new();
        project.file(
            "a.js",
            "import { b } from './b.js';\nexport const a = 1;\nexport const sum = () => a + b;\n",
        );
        project.file(
            "b.js",
            "import { a } from './a.js';\nexport const b = 2;\nexport const readA = () => a;\n",
        );
        let result = project
            .run("cycle.data.js", "import { sum } from './a.js';\nexport const x = sum();\n")
            .unwrap();
        assert_eq!(export(&result, "x"), &ExportValue::Number(3.0));
        assert!(result.depends_on(&ModuleId::new(project.root().join("b.js"))));
    }

    #[test]
    fn bare_package_imports_fail_to_resolve() {
        let project = Project::new();
        let err = project
            .run("pkg.data.js", "import _ from 'lodash';\nexport default _;\n")
            .unwrap_err();
        assert!(matches!(err, DataError::Resolve { ref specifier, .. } if specifier == "lodash"));
    }

    #[test]
    fn syntax_errors_are_compilation_errors() {
        let project = Project::new();
        let err = project.run("broken.data.js", "export const = ;\n").unwrap_err();
        assert!(matches!(err, DataError::Compilation { .. }));
    }

    #[test]
    fn each_evaluation_sees_fresh_files() {
        let project = Project::new();
        project.file("value.json", "1");
        let first = project
            .run("fresh.data.js", "import v from './value.json';\nexport default v;\n")
            .unwrap();
        project.file("value.json", "2");
        let second = project
            .run("fresh.data.js", "import v from './value.json';\nexport default v;\n")
            .unwrap();

        assert_eq!(export(&first, "default"), &ExportValue::Number(1.0));
        assert_eq!(export(&second, "default"), &ExportValue::Number(2.0));
    }

    #[test]
    fn follows_javascript_semantics() {
        let project = Project::new();
        let result = project
            .run(
                "semantics.data.js",
                r#"
                const fns = [];
                for (let i = 0; i < 3; i++) fns.push(() => i);
                function* numbers() { yield 1; yield 2; }
                const withGetter = { get doubled() { return 21 * 2; } };
                outer: for (const x of [1, 2]) { for (const y of [1, 2]) { if (y === 2) continue outer; } }
                export const length = '😀'.length;
                export const captured = fns.map((f) => f());
                export const ordered = { b: 1, 2: 2, 1: 1 };
                export const generated = [...numbers()];
                export const getter = withGetter.doubled;
                export const promised = await new Promise((resolve) => resolve(7));
                "#,
            )
            .unwrap();

        assert_eq!(export(&result, "length"), &ExportValue::Number(2.0));
        assert_eq!(json_of(&result, "captured"), json!([0, 1, 2]));
        let ExportValue::Record(ordered) = export(&result, "ordered") else {
            panic!("expected record");
        };
        let keys: Vec<_> = ordered.keys().cloned().collect();
        assert_eq!(keys, vec!["1", "2", "b"]);
        assert_eq!(json_of(&result, "generated"), json!([1, 2]));
        assert_eq!(export(&result, "getter"), &ExportValue::Number(42.0));
        assert_eq!(export(&result, "promised"), &ExportValue::Number(7.0));
    }

    #[test]
    fn commonjs_loaders_export_default() {
        let project = Project::new();
        project.file("data/site.json", r#"{ "name": "docs" }"#);
        let result = project
            .run(
                "site.data.cts",
                r#"
                const path = require('node:path');
                const site: { name: string } = require('./data/site.json');
                module.exports = { name: site.name, file: path.basename(__filename) };
                "#,
            )
            .unwrap();

        assert_eq!(
            json_of(&result, "default"),
            json!({ "name": "docs", "file": "site.data.cts" })
        );
        assert!(result.depends_on(&ModuleId::new(project.root().join("data/site.json"))));
    }

    #[test]
    fn directory_listings_are_dependencies() {
        let project = Project::new();
        project.file("posts/b.md", "# B\n");
        project.file("posts/a.md", "# A\n");
        let result = project
            .run(
                "posts.data.mjs",
                r#"
                import { readdirSync, readFileSync } from 'node:fs';
                const dir = new URL('./posts/', import.meta.url);
                export default readdirSync(dir)
                  .filter((name) => name.endsWith('.md'))
                  .map((name) => readFileSync(new URL(name, dir), 'utf8').trim());
                "#,
            )
            .unwrap();

        assert_eq!(json_of(&result, "default"), json!(["# A", "# B"]));
        assert!(result.depends_on(&ModuleId::new(project.root().join("posts"))));
        assert!(result.depends_on(&ModuleId::new(project.root().join("posts/a.md"))));
    }

    #[test]
    fn memory_limit_turns_runaway_allocation_into_an_error() {
        let project = Project::new();
        let path = project.file(
            "huge.data.js",
            "export const s = 'x'.repeat(64 * 1024 * 1024);\n",
        );
        let err = QuickJsExecutor::new()
            .with_memory_limit(16 * 1024 * 1024)
            .evaluate(&path, &project.config())
            .unwrap_err();
        assert!(matches!(err, DataError::Evaluation { .. }));
    }

    #[test]
    fn console_output_does_not_become_an_export() {
        let project = Project::new();
        let result = project
            .run("log.data.js", "console.log('loading', { n: 1 });\nexport const ok = true;\n")
            .unwrap();
        assert_eq!(result.exports.len(), 1);
    }

    #[tokio::test]
    async fn async_execute_runs_off_the_runtime() {
        let project = Project::new();
        let path = project.file("async.data.js", "export const ok = true;\n");
        let result = QuickJsExecutor::new()
            .execute(&path, &project.config())
            .await
            .unwrap();
        assert_eq!(export(&result, "ok"), &ExportValue::Bool(true));
    }
}
