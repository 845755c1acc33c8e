// ==========================================
// 集装箱排载工具 - 优化服务边界错误类型
// ==========================================
// 职责: 区分传输失败/超时/服务端结构化错误/报文解码失败
// 红线: 超时必须独立归类,不得混入一般传输错误
// ==========================================

use crate::domain::types::OperationKind;
use thiserror::Error;

/// 优化服务边界错误类型
#[derive(Error, Debug)]
pub enum OptimizerError {
    // ===== 客户端初始化 =====
    #[error("HTTP 客户端初始化失败: {0}")]
    ClientInit(String),

    // ===== 传输层 =====
    /// 未收到任何响应(连接失败/CORS 等)
    #[error("服务连接失败 ({operation}): {message}")]
    Transport {
        operation: OperationKind,
        message: String,
    },

    /// 超过该操作的等待上限
    #[error("请求超时 ({operation}): 超过 {timeout_secs}s 未收到响应")]
    Timeout {
        operation: OperationKind,
        timeout_secs: u64,
    },

    // ===== 服务端 =====
    /// 服务端返回结构化 {error} 报文
    #[error("服务端错误 (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// 错误报文无法按 文本 → JSON 解码
    #[error("服务端错误 (HTTP {status}),错误详情无法解析")]
    Decode { status: u16 },

    /// 导出成功响应但产物为空
    #[error("导出产物为空 (HTTP {status})")]
    EmptyArtifact { status: u16 },

    // ===== 结果结构 =====
    /// 成功响应不符合规范形态(含旧版扁平结果)
    #[error("响应结构不符合规范 ({operation}): {message}")]
    SchemaMismatch {
        operation: OperationKind,
        message: String,
    },
}

/// Result 类型别名
pub type OptimizerResult<T> = Result<T, OptimizerError>;
