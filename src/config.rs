//! 配置模块，负责加载 JSON 格式的引擎配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// 默认的本地集群名
pub const DEFAULT_CLUSTER: &str = "GROUPS";

/// 引擎配置结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 顶层表达式中 `@` 与 `?` 使用的本地集群; `None` 表示没有
    pub default_cluster: Option<String>,
    /// 集群值递归展开的最大深度
    pub max_depth: usize,
    /// 单个范围 `{a-b}` 允许展开的最大元素个数; `None` 表示不限制
    pub max_range_len: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cluster: Some(DEFAULT_CLUSTER.to_string()),
            max_depth: 100,
            max_range_len: None,
        }
    }
}

impl EngineConfig {
    /// 从JSON文件加载引擎配置, 缺失的字段使用默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(Error::Config(format!(
                "config file does not exist: {}",
                path_ref.display()
            )));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path_ref.display(), e))
        })?;

        // 解析JSON
        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("cannot parse config file {}: {}", path_ref.display(), e))
        })?;

        if config.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }

        Ok(config)
    }
}
