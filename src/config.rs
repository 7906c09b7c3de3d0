//! Defaults read from the environment, shared by the CLI and embedders.
use std::{str::FromStr, sync::LazyLock};

#[derive(Debug, Clone, PartialEq)]
pub struct MinilangConfig {
    /// Default for [`crate::vm::VMOptions`] `max_stack_size`.
    pub max_stack_size: usize,
    /// Default for [`crate::vm::VMOptions`] `max_op_count`.
    pub op_limit: u64,
    /// Log every executed instruction at `debug` level instead of `trace`.
    pub trace: bool,
}

impl MinilangConfig {
    #[inline]
    pub fn instruction_log_level(&self) -> log::Level {
        if self.trace {
            log::Level::Debug
        } else {
            log::Level::Trace
        }
    }
}

fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: FromStr + 'static, <T as FromStr>::Err: std::fmt::Display
{
    if let Ok(mut val) = std::env::var(key) {
        if std::any::TypeId::of::<T>() == std::any::TypeId::of::<bool>() {
            val = val.to_lowercase();
            if val == "1" || val == "yes" {
                val = "true".to_string();
            } else if val == "0" || val == "no" {
                val = "false".to_string();
            }
        }
        match val.parse::<T>() {
            Ok(v) => Some(v),
            Err(err) => if val.is_empty() {
                None
            } else {
                panic!("Failed to parse env var {key} with value {val}: {err}");
            }
        }
    } else {
        None
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + 'static, <T as FromStr>::Err: std::fmt::Display
{
    parse_env_opt(key).unwrap_or(default)
}

fn create_config() -> MinilangConfig {
    MinilangConfig {
        max_stack_size: parse_env("MINILANG_MAX_STACK_SIZE", 2097152),
        op_limit: parse_env("MINILANG_OP_LIMIT", u64::MAX),
        trace: parse_env("MINILANG_TRACE", false),
    }
}

static CELL: LazyLock<MinilangConfig> = LazyLock::new(create_config);

pub fn get_config() -> &'static MinilangConfig {
    &CELL
}
