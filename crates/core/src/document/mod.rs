//! Benchmark source documents: chains and candidate LiveSets on disk.
//!
//! Documents are YAML or JSON, picked by file extension (`.json` is JSON,
//! anything else YAML). A chain looks like:
//!
//! ```yaml
//! entry: main
//! functions:
//!   - name: inner
//!     params: [x]
//!     body:
//!       - assign: { target: y, expr: x + 1 }
//!       - assign: { target: z, expr: x * 99 }
//!     returns: y
//!   - name: main
//!     body:
//!       - call: { callee: inner, args: [4], target: r }
//!     returns: r
//! ```
//!
//! Statements are single-key maps (`assign`, `if`, `loop`, `call`,
//! `return`). Expressions are integers or strings in the syntax of
//! [`parse_expr`]; `@id` must be quoted in YAML.

mod expr;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chain::{compose, CallChain};
use crate::error::{BenchError, BenchResult};
use crate::model::{Expr, Function, Stmt};
use crate::validate::CandidateLiveSet;

pub use expr::{parse_expr, ExprParseError};

/// Chain document: an entry point plus every declared function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDocument {
    pub entry: String,
    pub functions: Vec<FunctionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDoc {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub body: Vec<StmtDoc>,
    /// Shorthand for a trailing `return` statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ExprDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtDoc {
    Assign {
        target: String,
        expr: ExprDoc,
    },
    If {
        cond: ExprDoc,
        #[serde(default)]
        then: Vec<StmtDoc>,
        #[serde(default, rename = "else")]
        otherwise: Vec<StmtDoc>,
    },
    Loop {
        bound: ExprDoc,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        counter: Option<String>,
        #[serde(default)]
        body: Vec<StmtDoc>,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<ExprDoc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Return(ExprDoc),
}

/// An expression as written in a document: a bare integer or infix text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprDoc {
    Int(i64),
    Text(String),
}

impl ExprDoc {
    pub fn to_expr(&self, function: &str) -> BenchResult<Expr> {
        match self {
            ExprDoc::Int(v) => Ok(Expr::Const(*v)),
            ExprDoc::Text(src) => parse_expr(src).map_err(|e| {
                BenchError::malformed(function, format!("cannot parse expression `{src}`: {e}"))
            }),
        }
    }
}

impl FunctionDoc {
    /// Build the model function; `returns`, when present, becomes the
    /// trailing `Return`.
    pub fn to_function(&self) -> BenchResult<Function> {
        let mut body = convert_block(&self.name, &self.body)?;
        if let Some(returns) = &self.returns {
            body.push(Stmt::ret(returns.to_expr(&self.name)?));
        }
        Function::new(&self.name, self.params.clone(), body)
    }
}

fn convert_block(function: &str, docs: &[StmtDoc]) -> BenchResult<Vec<Stmt>> {
    docs.iter().map(|doc| convert_stmt(function, doc)).collect()
}

fn convert_stmt(function: &str, doc: &StmtDoc) -> BenchResult<Stmt> {
    Ok(match doc {
        StmtDoc::Assign { target, expr } => Stmt::assign(target, expr.to_expr(function)?),
        StmtDoc::If { cond, then, otherwise } => Stmt::if_else(
            cond.to_expr(function)?,
            convert_block(function, then)?,
            convert_block(function, otherwise)?,
        ),
        StmtDoc::Loop { bound, counter, body } => Stmt::repeat(
            bound.to_expr(function)?,
            counter.clone(),
            convert_block(function, body)?,
        ),
        StmtDoc::Call { callee, args, target, id } => {
            let args = args.iter().map(|a| a.to_expr(function)).collect::<BenchResult<Vec<_>>>()?;
            let call = Stmt::call(target.clone(), callee, args);
            match id {
                Some(id) => call.with_call_id(id),
                None => call,
            }
        }
        StmtDoc::Return(expr) => Stmt::ret(expr.to_expr(function)?),
    })
}

impl ChainDocument {
    pub fn to_functions(&self) -> BenchResult<Vec<Function>> {
        self.functions.iter().map(FunctionDoc::to_function).collect()
    }

    /// Build every function and compose the chain from `entry`.
    pub fn compose(&self) -> BenchResult<CallChain> {
        let functions = self.to_functions()?;
        compose(&self.entry, &functions)
    }
}

/// A document read from disk, with the SHA-256 of its raw bytes.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub path: PathBuf,
    pub sha256: String,
    pub document: T,
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Parse a YAML document whose enums are written as single-key maps
/// (`- assign: {...}`) rather than YAML tags.
pub fn from_yaml_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_yaml::Error> {
    serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_slice(
        bytes,
    ))
}

pub fn from_yaml_str<T: DeserializeOwned>(src: &str) -> Result<T, serde_yaml::Error> {
    from_yaml_slice(src.as_bytes())
}

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Loaded<T>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {what} at {}", path.display()))?;
    let sha256 = sha256_bytes(&bytes);
    let document: T = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {what} JSON at {}", path.display()))?
    } else {
        from_yaml_slice(&bytes)
            .with_context(|| format!("Failed to parse {what} YAML at {}", path.display()))?
    };
    Ok(Loaded { path: path.to_path_buf(), sha256, document })
}

/// Load a chain document (YAML, or JSON for `.json`).
pub fn load_chain(path: &Path) -> Result<Loaded<ChainDocument>> {
    load(path, "chain document")
}

/// Load a candidate LiveSet document (YAML, or JSON for `.json`).
pub fn load_candidate(path: &Path) -> Result<Loaded<CandidateLiveSet>> {
    load(path, "candidate LiveSet")
}

/// Chain name used in reports and history: the file stem.
pub fn chain_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("chain").to_string()
}
