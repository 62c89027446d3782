//! `Config`: the JSON-shaped option map every driver-level entry point
//! (`CondGenMgr`, the per-fault `dtpg` driver) reads from, mirroring the
//! option-struct idiom `splr::config::Config` uses for its own solver
//! parameters (there realized with `structopt` since `splr` is
//! CLI-first; this crate is embedding-first, so `serde` is the natural
//! fit instead).

use serde::{Deserialize, Serialize};

use crate::error::{self, DtpgError};
use crate::justify::JustifyStrategy;
use crate::lowering::LowerMethod;

/// `extractor` only ever names one strategy today; a separate field
/// over a bare `String` (rather than folding it into `method`) because
/// the source's option surface treats it as an independent axis, and a
/// second extractor policy is a plausible future addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustKind {
    Just1,
    Just2,
}

impl From<JustKind> for JustifyStrategy {
    fn from(k: JustKind) -> Self {
        match k {
            JustKind::Just1 => JustifyStrategy::Just1,
            JustKind::Just2 => JustifyStrategy::Just2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Naive,
    Cover,
    Factor,
    Aig,
    Bdd,
}

impl From<MethodKind> for LowerMethod {
    fn from(m: MethodKind) -> Self {
        match m {
            MethodKind::Naive => LowerMethod::Naive,
            MethodKind::Cover => LowerMethod::Cover,
            MethodKind::Factor => LowerMethod::Factor,
            MethodKind::Aig => LowerMethod::Aig,
            MethodKind::Bdd => LowerMethod::Bdd,
        }
    }
}

/// The full option map, §6. Every field carries `#[serde(default)]` so
/// a caller's JSON document only needs to name the options it wants to
/// override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Opaque, passed through to the solver factory untouched; this
    /// crate never interprets it.
    #[serde(default)]
    pub sat_param: serde_json::Value,

    #[serde(default)]
    pub multi_thread: bool,

    #[serde(default = "default_thread_num")]
    pub thread_num: usize,

    #[serde(default = "default_loop_limit")]
    pub loop_limit: usize,

    #[serde(default = "default_method")]
    pub method: MethodKind,

    #[serde(default)]
    pub rewrite: bool,

    #[serde(default = "default_just")]
    pub just: JustKind,

    #[serde(default = "default_extractor")]
    pub extractor: ExtractorKind,

    #[serde(default)]
    pub debug: i32,
}

fn default_thread_num() -> usize {
    num_cpus::get()
}

fn default_loop_limit() -> usize {
    1000
}

fn default_method() -> MethodKind {
    MethodKind::Naive
}

fn default_just() -> JustKind {
    JustKind::Just1
}

fn default_extractor() -> ExtractorKind {
    ExtractorKind::Simple
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sat_param: serde_json::Value::Null,
            multi_thread: false,
            thread_num: default_thread_num(),
            loop_limit: default_loop_limit(),
            method: default_method(),
            rewrite: false,
            just: default_just(),
            extractor: default_extractor(),
            debug: 0,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> error::Result<Self> {
        serde_json::from_str(text).map_err(|e| DtpgError::InvalidOption {
            key: "config",
            detail: e.to_string(),
        })
    }

    /// The thread count `CondGenMgr` should actually spawn: `1` when
    /// `multi_thread` is off, regardless of what `thread_num` says.
    pub fn effective_thread_num(&self) -> usize {
        if self.multi_thread {
            self.thread_num.max(1)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_option_table() {
        let cfg = Config::default();
        assert!(!cfg.multi_thread);
        assert_eq!(cfg.loop_limit, 1000);
        assert_eq!(cfg.method, MethodKind::Naive);
        assert!(!cfg.rewrite);
        assert_eq!(cfg.just, JustKind::Just1);
        assert_eq!(cfg.extractor, ExtractorKind::Simple);
        assert_eq!(cfg.debug, 0);
        assert_eq!(cfg.effective_thread_num(), 1);
    }

    #[test]
    fn partial_json_fills_in_the_rest_from_defaults() {
        let cfg = Config::from_json(r#"{"method": "aig", "multi_thread": true}"#).unwrap();
        assert_eq!(cfg.method, MethodKind::Aig);
        assert!(cfg.multi_thread);
        assert_eq!(cfg.loop_limit, 1000);
        assert_eq!(cfg.effective_thread_num(), cfg.thread_num.max(1));
    }

    #[test]
    fn unknown_method_string_is_rejected() {
        let err = Config::from_json(r#"{"method": "bogus"}"#);
        assert!(err.is_err());
    }
}
