// ==========================================
// 集装箱排载工具 - API层错误类型
// ==========================================
// 职责: 定义面向会话的错误分类,转换服务边界错误
// 分类: 本地校验 / 传输 / 超时 / 服务端 / 解码 / 结构
// ==========================================

use crate::domain::loading::PlanInvariantError;
use crate::domain::types::{OperationKind, WorkflowStep};
use crate::optimizer::error::OptimizerError;
use thiserror::Error;

/// API层错误类型
///
/// 每条请求路径只产生一个结局: 步骤转换或一条此处的错误
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 本地前置校验错误(零网络请求)
    // ==========================================
    #[error("输入校验失败: {0}")]
    ValidationError(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的步骤转换: from={from} to={to}")]
    InvalidStateTransition {
        from: WorkflowStep,
        to: WorkflowStep,
    },

    /// 同一步骤至多一个在途请求
    #[error("请求进行中 ({operation}),该步骤的操作已被禁用")]
    RequestInFlight { operation: OperationKind },

    // ==========================================
    // 服务边界错误
    // ==========================================
    /// 未收到任何响应
    #[error("服务连接失败 ({operation}): {message}")]
    TransportError {
        operation: OperationKind,
        message: String,
    },

    /// 超过该操作的等待上限
    #[error("请求超时 ({operation}): 超过 {timeout_secs}s 未收到响应")]
    TimeoutError {
        operation: OperationKind,
        timeout_secs: u64,
    },

    /// 服务端返回结构化 {error}
    #[error("服务端错误: {message}")]
    ServerError { status: u16, message: String },

    /// 错误报文无法解码
    #[error("服务端错误 (HTTP {status}),错误详情无法解析")]
    DecodeError { status: u16 },

    /// 结果不符合规范形态或破坏不变量
    #[error("结果结构不符合规范: {0}")]
    SchemaMismatch(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 OptimizerError 转换
// 目的: 将服务边界的技术错误转换为会话可辨识的分类
// ==========================================
impl From<OptimizerError> for ApiError {
    fn from(err: OptimizerError) -> Self {
        match err {
            OptimizerError::ClientInit(msg) => ApiError::InternalError(msg),
            OptimizerError::Transport { operation, message } => {
                ApiError::TransportError { operation, message }
            }
            OptimizerError::Timeout {
                operation,
                timeout_secs,
            } => ApiError::TimeoutError {
                operation,
                timeout_secs,
            },
            OptimizerError::Server { status, message } => ApiError::ServerError { status, message },
            OptimizerError::Decode { status } => ApiError::DecodeError { status },
            OptimizerError::EmptyArtifact { status } => ApiError::ServerError {
                status,
                message: "导出产物为空".to_string(),
            },
            OptimizerError::SchemaMismatch { operation, message } => {
                ApiError::SchemaMismatch(format!("{}: {}", operation, message))
            }
        }
    }
}

// 模型边界校验失败同样归入结构错误
impl From<PlanInvariantError> for ApiError {
    fn from(err: PlanInvariantError) -> Self {
        ApiError::SchemaMismatch(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
